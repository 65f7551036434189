//! Public pricing table.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frequency {
    pub value: &'static str,
    pub label: &'static str,
    pub price_suffix: &'static str,
}

pub const FREQUENCIES: [Frequency; 2] = [
    Frequency {
        value: "monthly",
        label: "Monthly",
        price_suffix: "/month",
    },
    Frequency {
        value: "annually",
        label: "Annually",
        price_suffix: "/year",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierPrice {
    pub monthly: &'static str,
    pub annually: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingTier {
    pub id: &'static str,
    pub name: &'static str,
    pub href: &'static str,
    pub price: TierPrice,
    pub description: &'static str,
    pub features: Vec<&'static str>,
    pub button_text: &'static str,
    pub most_popular: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingTable {
    pub frequencies: [Frequency; 2],
    pub tiers: Vec<PricingTier>,
}

pub fn pricing_table() -> PricingTable {
    PricingTable {
        frequencies: FREQUENCIES,
        tiers: vec![
            PricingTier {
                id: "tier-free",
                name: "Free",
                href: "/login",
                price: TierPrice {
                    monthly: "€0",
                    annually: "€0",
                },
                description: "The essentials to start sharing documents securely.",
                features: vec![
                    "1 user",
                    "Unlimited links",
                    "Analytics for each page",
                    "Document sharing controls",
                ],
                button_text: "Start for free",
                most_popular: false,
            },
            PricingTier {
                id: "tier-freelancer",
                name: "Pro",
                href: "/login",
                price: TierPrice {
                    monthly: "€29",
                    annually: "€290",
                },
                description: "The essentials to provide a branded experience for your documents.",
                features: vec![
                    "Everything in Free, plus:",
                    "Up to 3 active users",
                    "Custom domain",
                    "Advanced access controls",
                    "Papermark AI",
                ],
                button_text: "Choose Pro",
                most_popular: false,
            },
            PricingTier {
                id: "tier-startup",
                name: "Business",
                href: "/login",
                price: TierPrice {
                    monthly: "€79",
                    annually: "€790",
                },
                description: "A plan that scales with your rapidly growing business.",
                features: vec![
                    "Everything in Pro, plus:",
                    "Up to 10 active users",
                    "Data room",
                    "Large file uploads",
                    "Custom Branding",
                    "24h Priority Support",
                ],
                button_text: "Choose Business",
                most_popular: true,
            },
            PricingTier {
                id: "tier-enterprise",
                name: "Enterprise",
                href: "https://cal.com/marcseitz/papermark",
                price: TierPrice {
                    monthly: "Custom",
                    annually: "Custom",
                },
                description: "Self-hosted and advanced infrastructure for your company.",
                features: vec![
                    "Self-Hosted version",
                    "Unlimited users",
                    "Unlimited documents",
                    "Different file types",
                    "Up to 5TB file uploads",
                    "Dedicated support",
                    "Custom Papermark AI",
                ],
                button_text: "Book a demo",
                most_popular: false,
            },
        ],
    }
}
