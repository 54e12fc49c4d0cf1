mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use account_api::models::{ProviderAccount, ProviderAccounts, UserPatch};
use account_api::database::UserStore;
use common::{Faults, TestServer};

fn account(provider: &str, id: &str, login: &str) -> ProviderAccount {
    let payload = json!({ "login": login });
    ProviderAccount::from_payload(provider, id, payload.as_object().unwrap().clone())
}

#[tokio::test]
async fn put_appends_new_provider_account() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.seed_user("alice@example.com").await;

    let res = server
        .put(&user, "/account/github/42")
        .json(&json!({ "login": "octocat", "accessToken": "t0k3n" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let stored = server.stored_user(user.id).await;
    assert_eq!(stored.accounts.len(), 1);
    let linked = stored.accounts.find("github", "42").expect("account stored");
    assert_eq!(linked.fields["login"], "octocat");
    assert_eq!(linked.fields["accessToken"], "t0k3n");
    Ok(())
}

#[tokio::test]
async fn put_replaces_existing_pair_without_growing() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.seed_user("alice@example.com").await;
    let accounts = ProviderAccounts::new(vec![account("github", "42", "old"), account("gitlab", "7", "lab")]);
    server.store.update_fields(user.id, UserPatch::accounts(accounts)).await?;

    let res = server
        .put(&user, "/account/github/42")
        .json(&json!({ "login": "new" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let stored = server.stored_user(user.id).await;
    assert_eq!(stored.accounts.len(), 2);
    assert_eq!(stored.accounts.find("github", "42").unwrap().fields["login"], "new");
    assert_eq!(stored.accounts.find("gitlab", "7").unwrap().fields["login"], "lab");
    // order is preserved
    assert_eq!(stored.accounts.iter().next().unwrap().provider, "github");
    Ok(())
}

#[tokio::test]
async fn put_uses_route_key_over_payload_key() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.seed_user("alice@example.com").await;

    server
        .put(&user, "/account/github/42")
        .json(&json!({ "provider": "bitbucket", "id": 9, "login": "octo" }))
        .send()
        .await?;

    let stored = server.stored_user(user.id).await;
    assert!(stored.accounts.find("github", "42").is_some());
    assert!(stored.accounts.find("bitbucket", "9").is_none());
    Ok(())
}

#[tokio::test]
async fn delete_is_forbidden_while_projects_use_the_provider() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.seed_user("alice@example.com").await;
    let accounts = ProviderAccounts::new(vec![account("github", "42", "octo")]);
    server.store.update_fields(user.id, UserPatch::accounts(accounts)).await?;
    server.seed_project("strider", "github").await;
    server.seed_project("docs", "github").await;
    server.seed_project("other", "gitlab").await;

    let res = server.delete(&user, "/account/github/42").send().await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        res.text().await?,
        "Cannot delete provider since projects are using this provider: strider, docs"
    );
    assert_eq!(server.stored_user(user.id).await.accounts.len(), 1);
    Ok(())
}

#[tokio::test]
async fn delete_removes_every_matching_entry() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.seed_user("alice@example.com").await;
    let accounts = ProviderAccounts::new(vec![
        account("github", "42", "a"),
        account("gitlab", "42", "b"),
        account("github", "42", "c"),
    ]);
    server.store.update_fields(user.id, UserPatch::accounts(accounts)).await?;

    let res = server.delete(&user, "/account/github/42").send().await?;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.text().await?.is_empty());
    let stored = server.stored_user(user.id).await;
    assert_eq!(stored.accounts.len(), 1);
    assert!(stored.accounts.find("gitlab", "42").is_some());
    Ok(())
}

#[tokio::test]
async fn delete_of_unknown_pair_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let user = server.seed_user("alice@example.com").await;
    let accounts = ProviderAccounts::new(vec![account("github", "42", "a")]);
    server.store.update_fields(user.id, UserPatch::accounts(accounts.clone())).await?;

    let res = server.delete(&user, "/account/github/43").send().await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await?, "Account not found");
    assert_eq!(server.stored_user(user.id).await.accounts, accounts);
    Ok(())
}

#[tokio::test]
async fn put_reports_failed_save() -> Result<()> {
    let server = TestServer::start_with_faults(Faults {
        fail_writes: true,
        ..Faults::default()
    })
    .await?;
    let user = server.seed_user("alice@example.com").await;

    let res = server
        .put(&user, "/account/github/42")
        .json(&json!({ "login": "octocat" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await?, "Failed to save one user");
    assert!(server.stored_user(user.id).await.accounts.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_reports_bad_data_when_project_lookup_fails() -> Result<()> {
    let server = TestServer::start_with_faults(Faults {
        fail_project_lookup: true,
        ..Faults::default()
    })
    .await?;
    let user = server.seed_user("alice@example.com").await;
    let accounts = ProviderAccounts::new(vec![account("github", "42", "octo")]);
    server.store.update_fields(user.id, UserPatch::accounts(accounts)).await?;

    let res = server.delete(&user, "/account/github/42").send().await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await?, "Failed do to bad data");
    assert_eq!(server.stored_user(user.id).await.accounts.len(), 1);
    Ok(())
}

#[tokio::test]
async fn delete_reports_failed_save() -> Result<()> {
    let server = TestServer::start_with_faults(Faults {
        fail_writes: true,
        ..Faults::default()
    })
    .await?;
    let user = server.seed_user("alice@example.com").await;
    let accounts = ProviderAccounts::new(vec![account("github", "42", "octo")]);
    server.store.update_fields(user.id, UserPatch::accounts(accounts)).await?;

    let res = server.delete(&user, "/account/github/42").send().await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await?, "Failed to save user");
    assert_eq!(server.stored_user(user.id).await.accounts.len(), 1);
    Ok(())
}
