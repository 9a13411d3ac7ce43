//! Resource type identifiers and fixed provisioning values

/// ARM namespace of the SignalR resource provider
pub const SIGNALR_NAMESPACE: &str = "Microsoft.SignalRService";

/// Resource type name inside [`SIGNALR_NAMESPACE`]
pub const SIGNALR_RESOURCE_TYPE_NAME: &str = "SignalR";

/// Fully qualified resource type used for name availability checks
pub const SIGNALR_RESOURCE_TYPE: &str = "Microsoft.SignalRService/SignalR";

/// App setting selecting the function worker (dotnet, node, ...)
pub const WORKER_RUNTIME_SETTING: &str = "FUNCTIONS_WORKER_RUNTIME";

/// App setting carrying the functions extension version (`~1`, `~2`, ...)
pub const EXTENSION_VERSION_SETTING: &str = "FUNCTIONS_EXTENSION_VERSION";

/// Throughput provisioned for every document collection (request units)
pub const DEFAULT_COLLECTION_THROUGHPUT: u32 = 400;

/// Tag key holding the SignalR service description
pub const DESCRIPTION_TAG: &str = "description";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signalr_resource_type_is_namespaced() {
        assert_eq!(
            SIGNALR_RESOURCE_TYPE,
            format!("{}/{}", SIGNALR_NAMESPACE, SIGNALR_RESOURCE_TYPE_NAME)
        );
    }
}
