//! Built-in category catalog used on first run.

use crate::models::{Category, FilterMode};

/// The fixed default category set, in match order.
///
/// Every category starts as ALLOW so a fresh install never silences anything.
#[must_use]
pub fn default_categories() -> Vec<Category> {
    let catalog: [(&str, &str, &[&str]); 8] = [
        (
            "messaging",
            "Messaging",
            &[
                "com.google.android.apps.messaging",
                "com.samsung.android.messaging",
                "org.thoughtcrime.securesms",
                "org.telegram.",
                "com.whatsapp",
                "com.facebook.orca",
                "com.viber.voip",
            ],
        ),
        (
            "social",
            "Social",
            &[
                "com.facebook.katana",
                "com.instagram.",
                "com.twitter.",
                "com.zhiliaoapp.musically",
                "com.snapchat.",
                "com.reddit.",
                "com.linkedin.",
            ],
        ),
        (
            "email",
            "Email",
            &[
                "com.google.android.gm",
                "com.microsoft.office.outlook",
                "com.yahoo.mobile.client.android.mail",
                "ch.protonmail.",
            ],
        ),
        (
            "work",
            "Work",
            &[
                "com.Slack",
                "com.microsoft.teams",
                "us.zoom.",
                "com.google.android.apps.meetings",
                "com.atlassian.",
            ],
        ),
        (
            "finance",
            "Banking & Finance",
            &[
                "com.paypal.",
                "com.revolut.",
                "com.google.android.apps.walletnfcrel",
                "com.venmo",
            ],
        ),
        (
            "shopping",
            "Shopping",
            &["com.amazon.mShop", "com.ebay.", "com.alibaba.aliexpresshd"],
        ),
        (
            "news",
            "News",
            &[
                "com.google.android.apps.magazines",
                "com.nytimes.",
                "bbc.mobile.news",
                "flipboard.app",
            ],
        ),
        (
            "games",
            "Games",
            &["com.supercell.", "com.king.", "com.mojang.", "com.roblox."],
        ),
    ];

    catalog
        .iter()
        .map(|(id, name, patterns)| {
            Category::new(id, name, patterns.iter().copied(), FilterMode::Allow)
        })
        .collect()
}
