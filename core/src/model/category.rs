use serde::{Serialize, Serializer};
use std::fmt;

/// Grouping label for records whose categorical field is absent.
pub const UNSPECIFIED: &str = "Non spécifié";

// Categorical wire literals. Known values get a variant, anything else is kept verbatim.
macro_rules! literal_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $literal:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub const KNOWN: &'static [&'static str] = &[$($literal),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $literal,)+
                    $name::Other(s) => s.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $($literal => $name::$variant,)+
                    _ => $name::Other(s),
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name::from(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

literal_enum!(
    /// Vehicle lifecycle state.
    VehicleStatus {
        Available => "disponible",
        InUse => "en-utilisation",
        InMaintenance => "en-maintenance",
        Sold => "vendu",
    }
);

literal_enum!(
    VehicleType {
        Car => "voiture",
        Truck => "camion",
        Motorcycle => "moto",
        Bus => "bus",
    }
);

literal_enum!(
    /// Upkeep (`entretien`) or repair (`réparation`).
    MaintenanceKind {
        Upkeep => "entretien",
        Repair => "réparation",
    }
);

literal_enum!(
    Role {
        Admin => "admin",
        Driver => "conducteur",
        Manager => "manager",
    }
);

/// Literal of an optional categorical value, or the fallback label.
pub fn label_of<T>(value: Option<&T>) -> String
where
    T: fmt::Display,
{
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNSPECIFIED.to_string())
}
