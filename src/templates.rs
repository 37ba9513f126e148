pub const KUSTOMIZATION_YAML: &str = include_str!("../templates/kustomization.yaml");

/// Render the kustomization config pointing its secret generator at `env_file`.
pub fn render_kustomization(env_file: &str) -> String {
    KUSTOMIZATION_YAML.replace("{{env_file}}", env_file)
}
