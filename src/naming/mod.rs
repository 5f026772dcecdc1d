//! Canonical service-name derivation.
//!
//! Actor services and their collaborators (endpoints, replicator channels,
//! settings sections) are addressed by names derived from the actor's
//! interface name. The rules here produce the same names on every node, so
//! configuration written against one replica resolves on all of them.

/// Default service-package prefix.
pub const DEFAULT_SERVICE_PACKAGE_PREFIX: &str = "FabricActorService";

/// Default application-name prefix.
pub const DEFAULT_APPLICATION_PREFIX: &str = "FabricActorApp";

/// Code package name.
pub const CODE_PACKAGE_NAME: &str = "Code";

/// Config package name.
pub const CONFIG_PACKAGE_NAME: &str = "Config";

/// Configuration key holding the replicator credential type.
pub const CREDENTIAL_TYPE_KEY: &str = "CredentialType";

/// Configuration section overriding the state-provider implementation.
pub const STATE_PROVIDER_OVERRIDE_SECTION: &str = "ActorStateProviderOverride";

/// Key within the override section naming the state provider.
pub const STATE_PROVIDER_OVERRIDE_KEY: &str = "ActorStateProvider";

/// URI scheme for application names.
pub const APPLICATION_URI_SCHEME: &str = "fabric:/";

/// Derive the canonical actor name from an actor interface name.
///
/// A leading `I` is stripped only when a second character exists and is not
/// lowercase (`IBookActor` names the `BookActor` interface; `Ignite` keeps
/// its `I`). The `Actor` suffix is appended unless already present, compared
/// case-insensitively.
pub fn actor_name(interface_name: &str) -> String {
    let mut chars = interface_name.chars();
    let stripped = match (chars.next(), chars.next()) {
        (Some('I'), Some(second)) if !second.is_lowercase() => &interface_name[1..],
        _ => interface_name,
    };
    if stripped.to_ascii_lowercase().ends_with("actor") {
        stripped.to_string()
    } else {
        format!("{stripped}Actor")
    }
}

/// Service name for an actor.
pub fn service_name(actor_name: &str) -> String {
    format!("{actor_name}Service")
}

/// Service name derived straight from an interface name.
pub fn service_name_from_interface(interface_name: &str) -> String {
    service_name(&actor_name(interface_name))
}

/// Registered service-type name.
pub fn service_type_name(service_name: &str) -> String {
    format!("{service_name}Type")
}

/// Primary endpoint resource name.
pub fn endpoint_name(service_name: &str) -> String {
    format!("{service_name}Endpoint")
}

/// V2 endpoint resource name.
pub fn endpoint_v2_name(service_name: &str) -> String {
    format!("{service_name}EndpointV2")
}

/// Wrapped-message endpoint resource name.
pub fn wrapped_message_endpoint_name(service_name: &str) -> String {
    format!("{service_name}EndpointV2_1")
}

/// Replicator endpoint resource name.
pub fn replicator_endpoint_name(service_name: &str) -> String {
    format!("{service_name}ReplicatorEndpoint")
}

/// Settings section holding replicator tuning.
pub fn replicator_config_section(service_name: &str) -> String {
    format!("{service_name}ReplicatorConfig")
}

/// Settings section holding replicator transport security.
pub fn replicator_security_config_section(service_name: &str) -> String {
    format!("{service_name}ReplicatorSecurityConfig")
}

/// Settings section holding state-provider tuning.
pub fn state_provider_settings_section(service_name: &str) -> String {
    format!("{service_name}ActorStateProviderSettings")
}

/// Settings section holding transport tuning.
pub fn transport_settings_section(service_name: &str) -> String {
    format!("{service_name}TransportSettings")
}

/// Settings section holding local-store tuning.
pub fn local_store_config_section(service_name: &str) -> String {
    format!("{service_name}LocalStoreConfig")
}

/// Service package name for a prefix; the default prefix when `None`.
pub fn service_package_name(prefix: Option<&str>) -> String {
    format!("{}Pkg", prefix.unwrap_or(DEFAULT_SERVICE_PACKAGE_PREFIX))
}

/// Normalize an application name into an application URI.
///
/// Names already carrying the `fabric:/` scheme (any case) are preserved;
/// anything else gets the scheme prepended. Trailing slashes are trimmed
/// first so later concatenation cannot double them.
pub fn application_uri(application_name: &str) -> String {
    let trimmed = application_name.trim_end_matches('/');
    let has_scheme = trimmed
        .get(..APPLICATION_URI_SCHEME.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(APPLICATION_URI_SCHEME));
    if has_scheme {
        trimmed.to_string()
    } else {
        format!("{APPLICATION_URI_SCHEME}{trimmed}")
    }
}

/// Fully qualified service URI under an application.
pub fn service_uri(application_name: &str, service_name: &str) -> String {
    format!("{}/{}", application_uri(application_name), service_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_name_strips_interface_prefix() {
        assert_eq!(actor_name("IBookActor"), "BookActor");
        assert_eq!(actor_name("IBook"), "BookActor");
    }

    #[test]
    fn test_actor_name_keeps_lowercase_second_char() {
        // "Ignite" is a word, not an interface prefix.
        assert_eq!(actor_name("Ignite"), "IgniteActor");
        assert_eq!(actor_name("Inventory"), "InventoryActor");
    }

    #[test]
    fn test_actor_name_single_char() {
        assert_eq!(actor_name("I"), "IActor");
        assert_eq!(actor_name("X"), "XActor");
    }

    #[test]
    fn test_actor_name_suffix_is_case_insensitive() {
        assert_eq!(actor_name("Book"), "BookActor");
        assert_eq!(actor_name("BookActor"), "BookActor");
        assert_eq!(actor_name("bookactor"), "bookactor");
        assert_eq!(actor_name("BOOKACTOR"), "BOOKACTOR");
    }

    #[test]
    fn test_service_name_chain() {
        let service = service_name_from_interface("IBook");
        assert_eq!(service, "BookActorService");
        assert_eq!(service_type_name(&service), "BookActorServiceType");
        assert_eq!(endpoint_name(&service), "BookActorServiceEndpoint");
        assert_eq!(endpoint_v2_name(&service), "BookActorServiceEndpointV2");
        assert_eq!(
            wrapped_message_endpoint_name(&service),
            "BookActorServiceEndpointV2_1"
        );
        assert_eq!(
            replicator_endpoint_name(&service),
            "BookActorServiceReplicatorEndpoint"
        );
    }

    #[test]
    fn test_settings_section_names() {
        let service = "BookActorService";
        assert_eq!(
            replicator_config_section(service),
            "BookActorServiceReplicatorConfig"
        );
        assert_eq!(
            replicator_security_config_section(service),
            "BookActorServiceReplicatorSecurityConfig"
        );
        assert_eq!(
            state_provider_settings_section(service),
            "BookActorServiceActorStateProviderSettings"
        );
        assert_eq!(
            transport_settings_section(service),
            "BookActorServiceTransportSettings"
        );
        assert_eq!(
            local_store_config_section(service),
            "BookActorServiceLocalStoreConfig"
        );
    }

    #[test]
    fn test_service_package_name() {
        assert_eq!(service_package_name(None), "FabricActorServicePkg");
        assert_eq!(service_package_name(Some("MyPrefix")), "MyPrefixPkg");
    }

    #[test]
    fn test_fixed_names() {
        assert_eq!(DEFAULT_APPLICATION_PREFIX, "FabricActorApp");
        assert_eq!(CODE_PACKAGE_NAME, "Code");
        assert_eq!(CONFIG_PACKAGE_NAME, "Config");
        assert_eq!(CREDENTIAL_TYPE_KEY, "CredentialType");
        assert_eq!(STATE_PROVIDER_OVERRIDE_SECTION, "ActorStateProviderOverride");
        assert_eq!(STATE_PROVIDER_OVERRIDE_KEY, "ActorStateProvider");
    }

    #[test]
    fn test_application_uri_prepends_scheme() {
        assert_eq!(application_uri("MyApp"), "fabric:/MyApp");
        assert_eq!(application_uri("MyApp/"), "fabric:/MyApp");
    }

    #[test]
    fn test_application_uri_preserves_existing_scheme() {
        assert_eq!(application_uri("fabric:/MyApp"), "fabric:/MyApp");
        assert_eq!(application_uri("FABRIC:/MyApp"), "FABRIC:/MyApp");
        assert_eq!(application_uri("fabric:/MyApp/"), "fabric:/MyApp");
    }

    #[test]
    fn test_service_uri() {
        assert_eq!(
            service_uri("MyApp", "BookActorService"),
            "fabric:/MyApp/BookActorService"
        );
        assert_eq!(
            service_uri("fabric:/MyApp/", "BookActorService"),
            "fabric:/MyApp/BookActorService"
        );
    }
}
