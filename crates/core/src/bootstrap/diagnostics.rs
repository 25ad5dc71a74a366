use crate::config::BootstrapSettings;
use crate::discovery::TypeDiscovery;
use crate::trace::EmergencyLogger;

/// Raw environment lines written before any configuration has been read
pub fn environment_lines(settings: &BootstrapSettings, discovery: &TypeDiscovery) -> Vec<String> {
    let registry = discovery.registry();
    let mut lines = vec![
        format!(
            "wireup {} on {}/{}, pid {}, {} cpus",
            crate::VERSION,
            std::env::consts::OS,
            std::env::consts::ARCH,
            std::process::id(),
            num_cpus::get()
        ),
        format!(
            "base path '{}', configuration resource '{}', default configuration '{}', strict {}",
            settings.base_path,
            settings.configuration_resource,
            settings.default_configuration,
            settings.exception_on_error
        ),
        format!("resources: {}", discovery.resources().describe()),
        format!("type registry holds {} types", registry.len()),
    ];

    for name in registry.names() {
        if let Some(type_ref) = registry.load_by_name(name) {
            let capabilities: Vec<_> = type_ref.capabilities().map(|c| c.name()).collect();
            lines.push(format!(
                "  {} ({:?}) [{}]",
                name,
                type_ref.kind(),
                capabilities.join(", ")
            ));
        }
    }
    lines
}

pub fn emit(settings: &BootstrapSettings, discovery: &TypeDiscovery) {
    for line in environment_lines(settings, discovery) {
        EmergencyLogger::debug(&line);
    }
}
