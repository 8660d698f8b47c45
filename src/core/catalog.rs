pub const TOPIC_SLOT: &str = "{topic}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub pattern: &'static str,
}

impl Template {
    pub fn apply(&self, topic: &str) -> String {
        self.pattern.replace(TOPIC_SLOT, topic)
    }
}

/// Built-in title patterns. The order is fixed so seeded shuffles are reproducible.
pub const CATALOG: [Template; 15] = [
    Template {
        id: "how-to",
        pattern: "How to {topic} in 2024 (Step-by-Step Guide)",
    },
    Template {
        id: "everything",
        pattern: "{topic} - Everything You Need to Know",
    },
    Template {
        id: "tried-for-30-days",
        pattern: "I Tried {topic} for 30 Days... Here's What Happened",
    },
    Template {
        id: "truth",
        pattern: "The TRUTH About {topic} Nobody Tells You",
    },
    Template {
        id: "beginner-tutorial",
        pattern: "{topic} Tutorial for Beginners (Complete Guide)",
    },
    Template {
        id: "change-your-life",
        pattern: "Why {topic} Will Change Your Life",
    },
    Template {
        id: "explained",
        pattern: "{topic} EXPLAINED in 10 Minutes",
    },
    Template {
        id: "mistakes",
        pattern: "Stop Making These {topic} Mistakes!",
    },
    Template {
        id: "tips-and-tricks",
        pattern: "{topic}: Tips & Tricks You NEED to Know",
    },
    Template {
        id: "ultimate-guide",
        pattern: "The Ultimate {topic} Guide (Watch This First!)",
    },
    Template {
        id: "versus",
        pattern: "{topic} vs Everything Else - Which is BEST?",
    },
    Template {
        id: "spent-1000",
        pattern: "I Spent $1000 on {topic} So You Don't Have To",
    },
    Template {
        id: "masterclass",
        pattern: "{topic} Masterclass - From Zero to Pro",
    },
    Template {
        id: "insider-secrets",
        pattern: "What They Don't Tell You About {topic}",
    },
    Template {
        id: "worth-it",
        pattern: "{topic} in 2024: Is It Worth It?",
    },
];
