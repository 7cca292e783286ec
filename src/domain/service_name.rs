#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn parse(name: String) -> Result<ServiceName, String> {
        if name.trim().is_empty() {
            return Err(String::from("service name cannot be empty"));
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
