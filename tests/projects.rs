use rlabz_site::projects::{self, PROJECTS, Project};
use std::collections::HashSet;

#[test]
fn ten_projects_with_unique_ids() {
    assert_eq!(projects::all().len(), 10);
    let ids: HashSet<u32> = PROJECTS.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), PROJECTS.len());
    assert!(ids.iter().all(|id| (1..=10).contains(id)));
}

#[test]
fn lookup_by_id() {
    assert_eq!(projects::project(3).map(|p| p.title), Some("Cocobies"));
    assert_eq!(projects::project(10).map(|p| p.title), Some("Aurora"));
    assert!(projects::project(0).is_none());
    assert!(projects::project(11).is_none());
}

#[test]
fn every_project_is_displayable() {
    for p in projects::all() {
        assert!(!p.title.is_empty(), "project {}", p.id);
        assert!(!p.description.is_empty(), "project {}", p.id);
        assert!(p.image.starts_with("https://"), "project {}", p.id);
        assert!(!p.tags.is_empty(), "project {}", p.id);
        assert!(!p.client.is_empty() && !p.date.is_empty(), "project {}", p.id);
        assert!(!p.link.is_empty(), "project {}", p.id);
    }
}

#[test]
fn byline_joins_client_and_year() {
    let splendore = projects::project(1).expect("project 1");
    assert_eq!(splendore.byline(), "Splendore Travel \u{b7} 2024");

    let undated = Project {
        date: "",
        ..*splendore
    };
    assert_eq!(undated.byline(), "Splendore Travel");
    let anonymous = Project {
        client: "",
        date: "",
        ..*splendore
    };
    assert_eq!(anonymous.byline(), "");
}
