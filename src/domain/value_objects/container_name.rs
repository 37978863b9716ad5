use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// Containers Azure reserves with fixed names
const RESERVED_CONTAINERS: [&str; 2] = ["$root", "$web"];

/// A validated blob container (bucket) name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerName(String);

impl ContainerName {
    /// Create a new ContainerName with Azure container naming rules
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if RESERVED_CONTAINERS.contains(&value.as_str()) {
            return Ok(Self(value));
        }

        // Length validation
        if value.len() < 3 {
            return Err(ValidationError::ContainerNameTooShort {
                actual: value.len(),
                min: 3,
            });
        }

        if value.len() > 63 {
            return Err(ValidationError::ContainerNameTooLong {
                actual: value.len(),
                max: 63,
            });
        }

        // Must start and end with lowercase letter or number
        if !value
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::ContainerNameInvalidStart);
        }

        if !value
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::ContainerNameInvalidEnd);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(ValidationError::ContainerNameInvalidCharacter(c));
            }
        }

        if value.contains("--") {
            return Err(ValidationError::ContainerNameConsecutiveHyphens);
        }

        Ok(Self(value))
    }

    /// Get the container name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContainerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ContainerName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContainerName> for String {
    fn from(name: ContainerName) -> Self {
        name.0
    }
}
