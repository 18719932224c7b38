//! Static portfolio table feeding the project galleries.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Project {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub image: &'static str,
    pub client: &'static str,
    pub date: &'static str,
    pub link: &'static str,
}

impl Project {
    /// "Client · year" line shown under the description.
    pub fn byline(&self) -> String {
        match (self.client.is_empty(), self.date.is_empty()) {
            (false, false) => format!("{} \u{b7} {}", self.client, self.date),
            (false, true) => self.client.to_string(),
            (true, false) => self.date.to_string(),
            (true, true) => String::new(),
        }
    }
}

pub static PROJECTS: &[Project] = &[
    Project {
        id: 1,
        title: "Splendore",
        description: "Luxury travel platform.",
        tags: &["Web", "Booking"],
        image: "https://picsum.photos/800/600?1",
        client: "Splendore Travel",
        date: "2024",
        link: "#",
    },
    Project {
        id: 2,
        title: "Euphoria",
        description: "Event management system.",
        tags: &["Web", "Dashboard"],
        image: "https://picsum.photos/800/600?2",
        client: "Euphoria Events",
        date: "2024",
        link: "#",
    },
    Project {
        id: 3,
        title: "Cocobies",
        description: "E-commerce web store.",
        tags: &["E-commerce"],
        image: "https://picsum.photos/800/600?3",
        client: "Cocobies",
        date: "2023",
        link: "#",
    },
    Project {
        id: 4,
        title: "The Luke",
        description: "Creative portfolio site.",
        tags: &["Web", "Branding"],
        image: "https://picsum.photos/800/600?4",
        client: "The Luke Studio",
        date: "2023",
        link: "#",
    },
    Project {
        id: 5,
        title: "NovaX",
        description: "AI SaaS Dashboard.",
        tags: &["SaaS", "AI"],
        image: "https://picsum.photos/800/600?5",
        client: "NovaX Labs",
        date: "2025",
        link: "#",
    },
    Project {
        id: 6,
        title: "Skyline",
        description: "Real estate platform.",
        tags: &["Web", "Maps"],
        image: "https://picsum.photos/800/600?6",
        client: "Skyline Realty",
        date: "2024",
        link: "#",
    },
    Project {
        id: 7,
        title: "Orbit",
        description: "Startup landing page.",
        tags: &["Landing"],
        image: "https://picsum.photos/800/600?7",
        client: "Orbit",
        date: "2025",
        link: "#",
    },
    Project {
        id: 8,
        title: "Zenith",
        description: "Marketing automation tool.",
        tags: &["SaaS", "Marketing"],
        image: "https://picsum.photos/800/600?8",
        client: "Zenith Digital",
        date: "2024",
        link: "#",
    },
    Project {
        id: 9,
        title: "Pulse",
        description: "Healthcare analytics.",
        tags: &["Analytics", "Cloud"],
        image: "https://picsum.photos/800/600?9",
        client: "Pulse Health",
        date: "2025",
        link: "#",
    },
    Project {
        id: 10,
        title: "Aurora",
        description: "Fintech mobile app.",
        tags: &["Mobile", "Fintech"],
        image: "https://picsum.photos/800/600?10",
        client: "Aurora Finance",
        date: "2025",
        link: "#",
    },
];

pub fn project(id: u32) -> Option<&'static Project> {
    PROJECTS.iter().find(|p| p.id == id)
}

pub fn all() -> &'static [Project] {
    PROJECTS
}
