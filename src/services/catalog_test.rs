use super::*;

fn new_stream(title: &str, category: &str) -> NewStream {
    NewStream { title: title.into(), category: category.into(), ..NewStream::default() }
}

#[test]
fn demo_has_six_streams() {
    let catalog = Catalog::demo();
    assert_eq!(catalog.len(), 6);
    let first = catalog.get("stream1").expect("stream1");
    assert_eq!(first.streamer, "GameMaster");
    assert_eq!(first.viewers, 1245);
}

#[test]
fn resolve_unknown_id_falls_back_to_placeholder() {
    let catalog = Catalog::demo();
    let record = catalog.resolve("nope");
    assert_eq!(record.id, "nope");
    assert_eq!(record.title, "Unknown Stream");
    assert_eq!(record.streamer, "Unknown");
    assert_eq!(record.category, "Miscellaneous");
    assert_eq!(record.viewers, 0);
    assert_eq!(record.description, "No description available.");
}

#[test]
fn list_filters_by_category_case_insensitively() {
    let catalog = Catalog::demo();
    let cooking = catalog.list(Some("cooking"));
    assert_eq!(cooking.len(), 1);
    assert_eq!(cooking[0].id, "stream2");
    assert_eq!(catalog.list(None).len(), 6);
    assert!(catalog.list(Some("Underwater Basket Weaving")).is_empty());
}

#[test]
fn create_requires_title_and_category() {
    let mut catalog = Catalog::demo();
    assert!(matches!(catalog.create(new_stream("", "gaming")), Err(CatalogError::MissingInformation)));
    assert!(matches!(catalog.create(new_stream("My stream", "  ")), Err(CatalogError::MissingInformation)));
    assert_eq!(catalog.len(), 6);
}

#[test]
fn create_rejects_unknown_category() {
    let mut catalog = Catalog::demo();
    let err = catalog.create(new_stream("Title", "knitting")).unwrap_err();
    assert!(matches!(err, CatalogError::UnknownCategory(ref c) if c == "knitting"));
}

#[test]
fn create_registers_live_stream() {
    let mut catalog = Catalog::demo();
    let record = catalog
        .create(new_stream("  Late Night Chat ", "just-chatting"))
        .expect("create");

    assert_eq!(record.id, "stream7");
    assert_eq!(record.title, "Late Night Chat");
    assert_eq!(record.category, "Just Chatting");
    assert_eq!(record.streamer, "CurrentUser");
    assert_eq!(record.viewers, 0);
    assert!(record.thumbnail.ends_with("text=Late+Night+Chat"));
    assert_eq!(catalog.resolve("stream7"), record);
}

#[test]
fn private_streams_are_hidden_from_browse_but_resolvable() {
    let mut catalog = Catalog::demo();
    let record = catalog
        .create(NewStream { is_private: true, ..new_stream("Secret", "art") })
        .expect("create");

    assert!(catalog.list(None).iter().all(|s| s.id != record.id));
    assert_eq!(catalog.resolve(&record.id).title, "Secret");
}

#[test]
fn categories_grid_matches_home_page() {
    let names: Vec<&str> = CATEGORIES.iter().map(|c| c.name).collect();
    assert_eq!(names, ["Gaming", "Music", "Art", "Tech", "Fitness", "IRL"]);
}

#[test]
fn share_links_point_at_stream_page() {
    let catalog = Catalog::demo();
    let record = catalog.resolve("stream2");
    let links = share_links(&record, "https://live.example.test/").expect("links");

    assert_eq!(links.url, "https://live.example.test/stream/stream2");
    assert!(links.twitter.starts_with("https://twitter.com/intent/tweet?text="));
    assert!(links.twitter.contains("ChefAlex%27s+stream"));
    assert!(links.twitter.contains("url=https%3A%2F%2Flive.example.test%2Fstream%2Fstream2"));
    assert_eq!(
        links.facebook,
        "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Flive.example.test%2Fstream%2Fstream2"
    );
}

#[test]
fn share_links_encode_the_stream_id_as_one_segment() {
    let record = StreamRecord::unknown("late night?q=1#chat/2");
    let links = share_links(&record, "https://live.example.test/watch").expect("links");

    assert_eq!(links.url, "https://live.example.test/watch/stream/late%20night%3Fq=1%23chat%2F2");
    let page = reqwest::Url::parse(&links.url).expect("page url");
    assert_eq!(page.query(), None);
    assert_eq!(page.fragment(), None);
    assert_eq!(page.path_segments().map(Iterator::count), Some(3));
}

#[test]
fn share_links_reject_relative_base() {
    let record = StreamRecord::unknown("x");
    assert!(matches!(share_links(&record, "not a url"), Err(CatalogError::InvalidBaseUrl(_))));
}
