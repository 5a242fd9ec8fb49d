//! Raw search text through the catalog core against a real SQLite store.

use std::sync::Arc;

use catalog_core::catalog::{ARCHIVES_CACHE, LISTING_NAMESPACE};
use catalog_core::{AppConfig, Catalog, Error, SearchRequest, Taxonomy};
use catalog_store::{NewArchive, SqliteStore};

async fn seeded() -> (SqliteStore, Catalog) {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let archives = [
        NewArchive::new("Zero Gravity", "/library/Zero Gravity [Eng].zip")
            .pages(24)
            .with(Taxonomy::Artist, &["John Doe"])
            .with(Taxonomy::Circle, &["Orbit Works"])
            .with(Taxonomy::Tag, &["Oneshot", "Color"]),
        NewArchive::new("Summer Days", "/library/summer_days.zip")
            .pages(180)
            .with(Taxonomy::Artist, &["Jane"])
            .with(Taxonomy::Parody, &["Original Work"])
            .with(Taxonomy::Tag, &["Anthology", "Color"]),
        NewArchive::new("Bob's Return", "/library/bobs-return.zip")
            .pages(40)
            .with(Taxonomy::Artist, &["Bob", "Jane"])
            .with(Taxonomy::Magazine, &["Monthly Comic"])
            .with(Taxonomy::Tag, &["Oneshot"]),
        NewArchive::new("Unreleased", "/library/unreleased.zip")
            .pages(12)
            .published(false)
            .with(Taxonomy::Tag, &["Oneshot"]),
    ];
    for archive in &archives {
        store.upsert_archive(archive).await.unwrap();
    }

    let shared = Arc::new(store.clone());
    let catalog = Catalog::new(&AppConfig::default(), shared.clone(), shared);
    (store, catalog)
}

async fn titles(catalog: &Catalog, query: &str) -> Vec<String> {
    let request = SearchRequest {
        query: query.to_string(),
        page: 1,
        sort: "title".into(),
        order: "asc".into(),
        ..Default::default()
    };
    let response = catalog.search(&request).await.unwrap();
    assert_eq!(response.listing.error, None, "query: {query}");
    assert_eq!(response.listing.total, response.listing.items.len() as i64, "query: {query}");
    response.listing.items.into_iter().map(|a| a.title).collect()
}

#[tokio::test]
async fn test_taxonomy_directives() {
    let (_store, catalog) = seeded().await;

    assert_eq!(titles(&catalog, "tag:oneshot").await, vec!["Bob's Return", "Zero Gravity"]);
    assert_eq!(titles(&catalog, "tag:anthology,oneshot").await, vec!["Bob's Return", "Summer Days", "Zero Gravity"]);
    assert_eq!(titles(&catalog, "tag&:color,oneshot").await, vec!["Zero Gravity"]);
    assert_eq!(titles(&catalog, "-tag:oneshot").await, vec!["Summer Days"]);
    assert_eq!(titles(&catalog, "circle:\"Orbit Works\"").await, vec!["Zero Gravity"]);
    assert_eq!(titles(&catalog, "magazine*:monthly").await, vec!["Bob's Return"]);
    assert_eq!(titles(&catalog, "parody:original-work").await, vec!["Summer Days"]);
}

#[tokio::test]
async fn test_or_group_with_exclusion() {
    let (_store, catalog) = seeded().await;
    assert_eq!(titles(&catalog, r#"artist:"John Doe",Jane -artist:Bob"#).await, vec!["Summer Days", "Zero Gravity"]);
}

#[tokio::test]
async fn test_wildcards() {
    let (_store, catalog) = seeded().await;
    assert_eq!(titles(&catalog, "artist*:doe").await, vec!["Zero Gravity"]);
    assert_eq!(titles(&catalog, "-tag*:col").await, vec!["Bob's Return"]);
    assert_eq!(titles(&catalog, "tag&*:on,col").await, vec!["Zero Gravity"]);
}

#[tokio::test]
async fn test_title_and_pages() {
    let (_store, catalog) = seeded().await;
    assert_eq!(titles(&catalog, "title:\"zero gravity\"").await, vec!["Zero Gravity"]);
    assert_eq!(titles(&catalog, "title*:days").await, vec!["Summer Days"]);
    assert_eq!(titles(&catalog, "pages:>30").await, vec!["Bob's Return", "Summer Days"]);
    assert_eq!(titles(&catalog, "pages:<=24").await, vec!["Zero Gravity"]);
    assert_eq!(titles(&catalog, "pages:>30 pages:40").await, vec!["Bob's Return"]);
    assert!(titles(&catalog, "pages:25").await.is_empty());
}

#[tokio::test]
async fn test_free_text_fallback() {
    let (_store, catalog) = seeded().await;

    // known tag
    assert_eq!(titles(&catalog, "oneshot").await, vec!["Bob's Return", "Zero Gravity"]);
    // known artist wins before tags are tried
    assert_eq!(titles(&catalog, "John Doe").await, vec!["Zero Gravity"]);
    // tokens checked as tags
    assert_eq!(titles(&catalog, "anthology oneshot").await, vec!["Bob's Return", "Summer Days", "Zero Gravity"]);
    // nothing matches: path substring, case-insensitive
    assert_eq!(titles(&catalog, "[ENG]").await, vec!["Zero Gravity"]);
    assert_eq!(titles(&catalog, "summer_days").await, vec!["Summer Days"]);
    assert!(titles(&catalog, "no such thing").await.is_empty());
}

#[tokio::test]
async fn test_path_fallback_folds_unicode_case() {
    let (store, catalog) = seeded().await;
    store.upsert_archive(&NewArchive::new("Été", "/library/ÉTÉ Sommer.zip").pages(30)).await.unwrap();
    store.upsert_archive(&NewArchive::new("Foo Bar", "/library/Foo  Bar.zip").pages(8)).await.unwrap();

    assert_eq!(titles(&catalog, "ÉTÉ Sommer").await, vec!["Été"]);
    assert_eq!(titles(&catalog, "été sommer").await, vec!["Été"]);
    assert_eq!(titles(&catalog, "Foo  Bar").await, vec!["Foo Bar"]);
    assert!(titles(&catalog, "foo bar").await.is_empty());
}

#[tokio::test]
async fn test_unknown_fields_are_inert_next_to_directives() {
    let (_store, catalog) = seeded().await;
    assert_eq!(titles(&catalog, "author:someone tag:color").await, vec!["Summer Days", "Zero Gravity"]);
}

#[tokio::test]
async fn test_paging_and_preloads() {
    let (store, catalog) = seeded().await;
    let config = AppConfig { page_size: 2, ..Default::default() };
    let shared = Arc::new(store.clone());
    let small = Catalog::new(&config, shared.clone(), shared);

    let request = SearchRequest {
        query: String::new(),
        page: 2,
        sort: "pages".into(),
        order: "asc".into(),
        preloads: vec!["artists".into(), "tags".into()],
    };
    let response = small.search(&request).await.unwrap();
    assert_eq!(response.listing.total, 3);
    assert_eq!(response.listing.items.len(), 1);
    let last = &response.listing.items[0];
    assert_eq!(last.title, "Summer Days");
    assert_eq!(last.artists.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(), vec!["Jane"]);
    assert_eq!(last.tags.len(), 2);
    assert!(last.parodies.is_empty());
    assert_eq!(response.pagination.total_pages, 2);
    assert_eq!(response.pagination.pages, vec![1, 2]);

    // the default catalog is untouched by the other instance
    assert_eq!(catalog.cache_stats()["archives"].size, 0);
}

#[tokio::test]
async fn test_cached_until_purged() {
    let (store, catalog) = seeded().await;

    assert_eq!(titles(&catalog, "tag:color").await.len(), 2);
    store
        .upsert_archive(&NewArchive::new("Late Arrival", "/library/late.zip").with(Taxonomy::Tag, &["Color"]))
        .await
        .unwrap();

    // served from cache
    assert_eq!(titles(&catalog, "tag:color").await.len(), 2);

    catalog.purge(ARCHIVES_CACHE, Some(LISTING_NAMESPACE)).unwrap();
    assert_eq!(titles(&catalog, "tag:color").await.len(), 3);
}

#[tokio::test]
async fn test_archive_lookup() {
    let (store, catalog) = seeded().await;

    let found = catalog.archive(1, &["tags".into(), "circles".into()]).await;
    let archive = found.archive.unwrap();
    assert_eq!(archive.title, "Zero Gravity");
    assert_eq!(archive.circles[0].slug, "orbit-works");
    assert_eq!(archive.tags.len(), 2);

    // unpublished archives are not found, and that answer is cached
    let hidden = catalog.archive(4, &[]).await;
    assert_eq!(hidden.error, Some(Error::ArchiveNotFound(4)));
    store.set_published(4, true).await.unwrap();
    assert_eq!(catalog.archive(4, &[]).await.error, Some(Error::ArchiveNotFound(4)));
    catalog.purge("archive", Some("4")).unwrap();
    assert!(catalog.archive(4, &[]).await.archive.is_some());
}

#[tokio::test]
async fn test_taxonomy_listing() {
    let (_store, catalog) = seeded().await;

    let tags = catalog.taxonomies(Taxonomy::Tag, 0, 0).await;
    assert_eq!(tags.total, 3);
    let counts: Vec<(&str, Option<i64>)> = tags.items.iter().map(|t| (t.slug.as_str(), t.count)).collect();
    assert_eq!(counts, vec![("anthology", Some(1)), ("color", Some(2)), ("oneshot", Some(2))]);

    let page = catalog.taxonomies(Taxonomy::Artist, 1, 1).await;
    assert_eq!(page.total, 3);
    assert_eq!(page.items[0].name, "Jane");
}
