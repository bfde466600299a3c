use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const ORPHAN_LISTING: &str = r#"{"code":200,"data":[{"id":"p-old","slug":"old","token":"tok-old","appearance":"norm","title":"Old","body":"gone\n"}]}"#;

fn blogsync(dir: &std::path::Path, server: &MockServer) -> Result<Command, Box<dyn std::error::Error>> {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("blogsync")?;
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("WA_URL", server.base_url())
        .env("WA_TOKEN", "test-token")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn publish_warns_about_orphans_without_delete() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("content"))?;

    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/me/posts")
            .header("authorization", "Token test-token");
        then.status(200)
            .header("content-type", "application/json")
            .body(ORPHAN_LISTING);
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/posts/p-old");
        then.status(204);
    });

    blogsync(dir.path(), &server)?
        .arg("publish")
        .assert()
        .success()
        .stderr(predicate::str::contains("would be orphaned"));

    list.assert();
    delete.assert_calls(0);
    Ok(())
}

#[test]
fn publish_deletes_orphans_with_delete() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("content"))?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/me/posts");
        then.status(200)
            .header("content-type", "application/json")
            .body(ORPHAN_LISTING);
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE)
            .path("/posts/p-old")
            .query_param("token", "tok-old");
        then.status(204);
    });

    blogsync(dir.path(), &server)?
        .args(["publish", "--delete"])
        .assert()
        .success();

    delete.assert();
    Ok(())
}

#[test]
fn publish_creates_new_page_in_collection() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let content = dir.path().join("content");
    fs::create_dir_all(&content)?;
    fs::write(
        dir.path().join("config.toml"),
        "languageCode = \"en\"\ncollection = \"blog\"\n",
    )?;
    fs::write(
        content.join("hi.md"),
        "+++\ntitle = \"Hi\"\ndate = \"2020-01-01\"\n+++\nhello\nworld\n",
    )?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/me/posts");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"code":200,"data":[]}"#);
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/collections/blog/posts")
            .json_body_includes(
                r#"{"slug":"hi","title":"Hi","body":"hello world\n","lang":"en","font":"norm"}"#,
            );
        then.status(201)
            .header("content-type", "application/json")
            .body(r#"{"code":201,"data":{"id":"p-new","slug":"hi"}}"#);
    });
    let unpin = server.mock(|when, then| {
        when.method(POST).path("/collections/blog/unpin");
        then.status(200).body(r#"{"code":200,"data":[]}"#);
    });

    blogsync(dir.path(), &server)?
        .arg("publish")
        .assert()
        .success();

    create.assert();
    unpin.assert();
    Ok(())
}

#[test]
fn publish_dry_run_makes_no_writes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let content = dir.path().join("content");
    fs::create_dir_all(&content)?;
    fs::write(content.join("hi.md"), "+++\ntitle = \"Hi\"\n+++\nhello\n")?;

    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET).path("/me/posts");
        then.status(200)
            .header("content-type", "application/json")
            .body(ORPHAN_LISTING);
    });
    let writes = server.mock(|when, then| {
        when.method(POST);
        then.status(500);
    });
    let deletes = server.mock(|when, then| {
        when.method(DELETE);
        then.status(500);
    });

    blogsync(dir.path(), &server)?
        .args(["publish", "--dry-run", "--delete"])
        .assert()
        .success();

    list.assert();
    writes.assert_calls(0);
    deletes.assert_calls(0);
    Ok(())
}

#[test]
fn publish_fails_when_listing_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("content"))?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/me/posts");
        then.status(401)
            .header("content-type", "application/json")
            .body(r#"{"code":401,"error_msg":"Invalid access token."}"#);
    });

    blogsync(dir.path(), &server)?
        .arg("publish")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid access token."));
    Ok(())
}

#[test]
fn convert_dry_run_leaves_files_alone() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let content = dir.path().join("content");
    fs::create_dir_all(&content)?;
    let page = content.join("post.md");
    let yaml = "---\ntitle: Post\n---\nbody\n";
    fs::write(&page, yaml)?;

    let server = MockServer::start();
    blogsync(dir.path(), &server)?
        .args(["convert", "--dry-run"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&page)?, yaml);

    blogsync(dir.path(), &server)?
        .arg("convert")
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&page)?, "+++\ntitle = \"Post\"\n+++\n\nbody\n");
    Ok(())
}

#[test]
fn collections_are_printed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/me/collections");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"code":200,"data":[{"alias":"blog","title":"My Blog"}]}"#);
    });

    blogsync(dir.path(), &server)?
        .arg("collections")
        .assert()
        .success()
        .stdout(predicate::str::contains("blog\tMy Blog"));
    Ok(())
}

#[test]
fn missing_token_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let server = MockServer::start();
    blogsync(dir.path(), &server)?
        .env_remove("WA_TOKEN")
        .arg("collections")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no access token found"));
    Ok(())
}

#[test]
fn publish_help_documents_template_data() -> Result<(), Box<dyn std::error::Error>> {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("blogsync")?;
    cmd.args(["publish", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[config.params]"))
        .stdout(predicate::str::contains("{{ body }}"));
    Ok(())
}
