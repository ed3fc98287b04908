use arkham_catalog::config::Config;
use arkham_catalog::{ArkhamDbClient, Catalog, CatalogCache, CatalogError};
use mockito::{Server, ServerGuard};

fn client_for(server: &ServerGuard) -> ArkhamDbClient {
    let config = Config::with_base(&server.url()).unwrap();
    ArkhamDbClient::new(&config).unwrap()
}

#[test]
fn server_error_is_a_fetch_failure() {
    let mut server = Server::new();
    let cards = server
        .mock("GET", "/cards/")
        .with_status(500)
        .with_body("boom")
        .create();

    let client = client_for(&server);
    let err = Catalog::load(&client).unwrap_err();
    cards.assert();

    match err {
        CatalogError::FetchFailed {
            resource, status, ..
        } => {
            assert_eq!(resource, "cards");
            assert_eq!(status, Some(500));
        }
        other => panic!("expected FetchFailed, got {other:?}"),
    }
}

#[test]
fn pack_failure_also_fails_the_load() {
    let mut server = Server::new();
    server
        .mock("GET", "/cards/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"code":"01001","name":"Roland Banks","faction_code":"guardian","type_code":"investigator"}]"#)
        .create();
    server.mock("GET", "/packs/").with_status(404).create();

    let cache = CatalogCache::new(client_for(&server));
    let err = cache.load().unwrap_err();
    assert!(matches!(
        err,
        CatalogError::FetchFailed { status: Some(404), .. }
    ));
}

#[test]
fn undecodable_body_is_a_fetch_failure() {
    let mut server = Server::new();
    server
        .mock("GET", "/cards/")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create();

    let err = Catalog::load(&client_for(&server)).unwrap_err();
    assert!(err.is_fetch_failure());
}

#[test]
fn successful_fetch_builds_the_catalog() {
    let mut server = Server::new();
    server
        .mock("GET", "/cards/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"code":"01001","name":"Roland Banks","faction_code":"guardian","type_code":"investigator","pack_code":"01","pack_name":"Core Set"},
                null,
                {"code":"02020","name":"Bandolier","faction_code":"guardian","type_code":"asset","pack_code":"02","pack_name":"Dunwich","xp":0}
            ]"#,
        )
        .create();
    server
        .mock("GET", "/packs/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"code":"01","name":"Core Set"},{"code":"02"}]"#)
        .create();

    let cache = CatalogCache::new(client_for(&server));
    let (_, catalog) = cache.load().unwrap();
    assert_eq!(catalog.cards().len(), 2);
    assert_eq!(catalog.packs().len(), 1);
    assert_eq!(
        catalog.find("02020").and_then(|c| c.expansion.as_deref()),
        Some("The Dunwich Legacy")
    );
}

#[test]
fn cached_catalog_does_not_refetch() {
    let mut server = Server::new();
    let cards = server
        .mock("GET", "/cards/")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create();
    let packs = server
        .mock("GET", "/packs/")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create();

    let cache = CatalogCache::new(client_for(&server));
    cache.load().unwrap();
    cache.load().unwrap();
    cards.assert();
    packs.assert();
}
