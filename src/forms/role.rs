use serde::Deserialize;

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct RoleForm {
    #[serde(default)]
    pub role: Option<String>,
}
