use serde::{Deserialize, Serialize};

use crate::model::category::Role;
use crate::model::lenient;
use crate::model::reference::Identified;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::category")]
    pub role: Option<Role>,
}

impl User {
    pub fn new(first_name: &str, last_name: &str, role: Role) -> Self {
        Self {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            role: Some(role),
            ..Default::default()
        }
    }

    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_driver(&self) -> bool {
        self.role == Some(Role::Driver)
    }
}

impl Identified for User {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_name(&self) -> String {
        let name = self.full_name();
        if name.is_empty() {
            self.email.clone().or_else(|| self.id.clone()).unwrap_or_default()
        } else {
            name
        }
    }
}
