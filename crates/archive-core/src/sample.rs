//! Starter collection seeded on first launch.

use chrono::{DateTime, Utc};

use crate::item::{ItemKind, ResearchItem};

struct Seed {
    id: &'static str,
    kind: ItemKind,
    title: &'static str,
    tags: [&'static str; 3],
    category: &'static str,
    description: &'static str,
    url: &'static str,
    thumbnail: Option<&'static str>,
}

const SEEDS: [Seed; 4] = [
    Seed {
        id: "1",
        kind: ItemKind::Paper,
        title: "The Impact of AI on Modern Research",
        tags: ["AI", "Technology", "Research"],
        category: "Technology",
        description: "A comprehensive study on how AI is transforming research methodologies.",
        url: "https://example.com/ai-research.pdf",
        thumbnail: None,
    },
    Seed {
        id: "2",
        kind: ItemKind::Video,
        title: "Understanding Quantum Computing",
        tags: ["Quantum", "Computing", "Physics"],
        category: "Science",
        description: "An in-depth explanation of quantum computing principles.",
        url: "https://www.youtube.com/embed/JhHMJCUmq28",
        thumbnail: Some("https://i.ytimg.com/vi/JhHMJCUmq28/hqdefault.jpg"),
    },
    Seed {
        id: "3",
        kind: ItemKind::Documentary,
        title: "The Hidden Life of Trees",
        tags: ["Nature", "Biology", "Environment"],
        category: "Nature",
        description: "Exploring the complex communication systems between trees.",
        url: "https://example.com/trees-documentary",
        thumbnail: Some("/placeholder.svg?height=200&width=300"),
    },
    Seed {
        id: "4",
        kind: ItemKind::Image,
        title: "Neural Network Visualization",
        tags: ["AI", "Visualization", "Neural Networks"],
        category: "Technology",
        description: "Visual representation of a neural network architecture.",
        url: "/placeholder.svg?height=400&width=600",
        thumbnail: None,
    },
];

/// The four-item sample dataset, stamped with `now`.
pub fn sample_items(now: DateTime<Utc>) -> Vec<ResearchItem> {
    SEEDS
        .iter()
        .map(|s| ResearchItem {
            id: s.id.to_string(),
            kind: s.kind,
            title: s.title.to_string(),
            tags: s.tags.iter().map(|t| t.to_string()).collect(),
            category: s.category.to_string(),
            description: s.description.to_string(),
            url: s.url.to_string(),
            thumbnail: s.thumbnail.map(str::to_string),
            created_at: now,
            view_count: 0,
            last_viewed: None,
            favorite: false,
            featured: false,
        })
        .collect()
}
