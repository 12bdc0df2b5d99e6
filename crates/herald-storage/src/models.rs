use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Filter setting attached to a category or an app override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterMode {
    /// No restriction contributed
    #[default]
    Allow,
    /// Notifications are fully suppressed
    Block,
    /// Notifications are announced with content redacted
    Private,
}

impl FilterMode {
    /// Disposition this mode produces when nothing else applies
    #[must_use]
    pub const fn disposition(self) -> Disposition {
        match self {
            Self::Allow => Disposition::Speak,
            Self::Block => Disposition::Block,
            Self::Private => Disposition::Private,
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "ALLOW"),
            Self::Block => write!(f, "BLOCK"),
            Self::Private => write!(f, "PRIVATE"),
        }
    }
}

impl std::str::FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "block" => Ok(Self::Block),
            "private" => Ok(Self::Private),
            _ => Err(format!("Unknown filter mode: {s}")),
        }
    }
}

/// Final decision handed to the announcement pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Disposition {
    Speak,
    Block,
    Private,
}

impl Disposition {
    /// Precedence rank: PRIVATE > BLOCK > SPEAK
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Speak => 0,
            Self::Block => 1,
            Self::Private => 2,
        }
    }

    /// Pick whichever of the two dispositions takes precedence
    #[must_use]
    pub const fn max_precedence(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Speak => write!(f, "SPEAK"),
            Self::Block => write!(f, "BLOCK"),
            Self::Private => write!(f, "PRIVATE"),
        }
    }
}

impl std::str::FromStr for Disposition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "speak" | "allow" => Ok(Self::Speak),
            "block" => Ok(Self::Block),
            "private" => Ok(Self::Private),
            _ => Err(format!("Unknown disposition: {s}")),
        }
    }
}

/// Category - a named, ordered set of package prefixes sharing one filter mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable join key, never changes once created
    pub id: String,
    pub display_name: String,
    /// Case-sensitive package-name prefixes, in match order
    #[serde(default)]
    pub package_patterns: Vec<String>,
    #[serde(default)]
    pub filter_mode: FilterMode,
}

impl Category {
    /// Create a category, dropping duplicate patterns while keeping first-seen order
    #[must_use]
    pub fn new<I, S>(id: &str, display_name: &str, patterns: I, filter_mode: FilterMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut package_patterns: Vec<String> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            if !package_patterns.contains(&pattern) {
                package_patterns.push(pattern);
            }
        }

        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            package_patterns,
            filter_mode,
        }
    }

    /// Check whether any pattern is a prefix of the package.
    /// Blank patterns never match.
    #[must_use]
    pub fn matches(&self, package: &str) -> bool {
        self.package_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && package.starts_with(pattern.as_str()))
    }
}

/// Auxiliary rule condition. Closed set, evaluated by one exhaustive match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Any of these accessories is connected (empty set: any accessory at all)
    BluetoothConnected {
        #[serde(default)]
        devices: BTreeSet<String>,
    },
    /// Connected to one of these networks
    WifiConnected {
        #[serde(default)]
        ssids: BTreeSet<String>,
    },
    /// The effective foreground app is one of these packages
    ForegroundApp {
        #[serde(default)]
        packages: BTreeSet<String>,
    },
    /// The notifying package belongs to this category
    AppInCategory { category_id: String },
    /// Title or text contains any of these words
    ContainsWords {
        #[serde(default)]
        words: Vec<String>,
    },
}

impl Condition {
    /// Short label for listings
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BluetoothConnected { .. } => "bluetooth",
            Self::WifiConnected { .. } => "wifi",
            Self::ForegroundApp { .. } => "foreground",
            Self::AppInCategory { .. } => "category",
            Self::ContainsWords { .. } => "words",
        }
    }

    /// Human-readable argument summary
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::BluetoothConnected { devices } if devices.is_empty() => {
                String::from("any device")
            }
            Self::BluetoothConnected { devices: items }
            | Self::WifiConnected { ssids: items }
            | Self::ForegroundApp { packages: items } => {
                items.iter().cloned().collect::<Vec<_>>().join(", ")
            }
            Self::AppInCategory { category_id } => category_id.clone(),
            Self::ContainsWords { words } => words.join(", "),
        }
    }
}

/// User-defined rule mapping a condition to a disposition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub condition: Condition,
    pub action: Disposition,
}

const fn default_enabled() -> bool {
    true
}

impl Rule {
    #[must_use]
    pub fn new(name: String, condition: Condition, action: Disposition) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            enabled: true,
            condition,
            action,
        }
    }
}
