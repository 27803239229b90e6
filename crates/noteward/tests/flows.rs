//! End-to-end flows through the Noteward service.
//!
//! These tests run against the real SQLite backend (in memory) so the
//! uniqueness constraints and transaction boundaries are the ones enforced
//! in production.

use noteward::store::SqliteStore;
use noteward::{Error, Noteward, NotewardConfig, NotePatch, Visibility, TOKEN_LEN};

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";
const CAROL: &str = "carol@example.com";

async fn service_with_users() -> Noteward<SqliteStore> {
    let svc = Noteward::new(
        SqliteStore::open_memory().unwrap(),
        NotewardConfig::default(),
    );
    for email in [ALICE, BOB, CAROL] {
        svc.register_user(email).await.unwrap();
    }
    svc
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let svc = service_with_users().await;
    assert!(matches!(
        svc.register_user(ALICE).await,
        Err(Error::Conflict(_))
    ));
}

#[tokio::test]
async fn test_owner_reads_at_every_visibility() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    for visibility in [Visibility::Private, Visibility::Shared, Visibility::Public] {
        svc.update_note(
            note.id,
            ALICE,
            NotePatch {
                visibility: Some(visibility),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(svc.get_note(note.id, ALICE).await.unwrap().id, note.id);
    }
}

#[tokio::test]
async fn test_private_note_forbidden_for_stranger() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    // Forbidden, not NotFound: the authenticated path does not hide existence.
    assert!(matches!(
        svc.get_note(note.id, BOB).await,
        Err(Error::Forbidden)
    ));
}

#[tokio::test]
async fn test_share_grants_read_and_forces_shared_over_public() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    // Take the note to PUBLIC first; the share must overwrite it.
    svc.create_public_link(note.id, ALICE, None).await.unwrap();
    assert_eq!(
        svc.get_note(note.id, ALICE).await.unwrap().visibility,
        Visibility::Public
    );

    svc.create_share(note.id, ALICE, BOB).await.unwrap();

    let seen = svc.get_note(note.id, BOB).await.unwrap();
    assert_eq!(seen.visibility, Visibility::Shared);
}

#[tokio::test]
async fn test_public_link_resolves_without_any_principal() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "secret", "body", &[]).await.unwrap();

    let link = svc.create_public_link(note.id, ALICE, None).await.unwrap();
    assert_eq!(link.token.as_str().len(), TOKEN_LEN);

    let seen = svc.resolve_public_token(link.token.as_str()).await.unwrap();
    assert_eq!(seen.id, note.id);
    assert_eq!(seen.visibility, Visibility::Public);
}

#[tokio::test]
async fn test_expired_is_distinct_from_not_found() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    let link = svc
        .create_public_link(note.id, ALICE, Some(now_millis() - 1_000))
        .await
        .unwrap();

    assert!(matches!(
        svc.resolve_public_token(link.token.as_str()).await,
        Err(Error::Expired)
    ));
    assert!(matches!(
        svc.resolve_public_token("00000000000000000000000000000000").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_future_expiry_still_resolves() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    let link = svc
        .create_public_link(note.id, ALICE, Some(now_millis() + 60_000))
        .await
        .unwrap();
    assert!(svc.resolve_public_token(link.token.as_str()).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_share_conflicts_and_original_untouched() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    let share = svc.create_share(note.id, ALICE, BOB).await.unwrap();
    assert!(matches!(
        svc.create_share(note.id, ALICE, BOB).await,
        Err(Error::Conflict(_))
    ));

    let shares = svc.list_shares(note.id, ALICE).await.unwrap();
    assert_eq!(shares, vec![share]);
}

#[tokio::test]
async fn test_share_precondition_order() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    // Ownership is checked before the target lookup: a non-owner sharing to
    // an unknown email sees Forbidden, not NotFound.
    assert!(matches!(
        svc.create_share(note.id, BOB, "nobody@example.com").await,
        Err(Error::Forbidden)
    ));

    // The owner sharing to an unknown email sees NotFound.
    assert!(matches!(
        svc.create_share(note.id, ALICE, "nobody@example.com").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_revocation_never_downgrades_visibility() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    let share = svc.create_share(note.id, ALICE, BOB).await.unwrap();
    svc.delete_share(share.id, ALICE).await.unwrap();
    assert_eq!(
        svc.get_note(note.id, ALICE).await.unwrap().visibility,
        Visibility::Shared
    );

    let link = svc.create_public_link(note.id, ALICE, None).await.unwrap();
    svc.delete_public_link(link.id, ALICE).await.unwrap();
    assert_eq!(
        svc.get_note(note.id, ALICE).await.unwrap().visibility,
        Visibility::Public
    );
}

#[tokio::test]
async fn test_explicit_private_demotion_leaves_grants_live() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();
    svc.create_share(note.id, ALICE, BOB).await.unwrap();

    // The owner demotes to PRIVATE while the share row survives; the grant
    // still wins on the read path.
    svc.update_note(
        note.id,
        ALICE,
        NotePatch {
            visibility: Some(Visibility::Private),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let seen = svc.get_note(note.id, BOB).await.unwrap();
    assert_eq!(seen.visibility, Visibility::Private);

    // A third party with no grant stays out.
    assert!(matches!(
        svc.get_note(note.id, CAROL).await,
        Err(Error::Forbidden)
    ));
}

#[tokio::test]
async fn test_owner_only_mutations() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();
    let share = svc.create_share(note.id, ALICE, BOB).await.unwrap();
    let link = svc.create_public_link(note.id, ALICE, None).await.unwrap();

    let patch = NotePatch {
        title: Some("hijacked".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        svc.update_note(note.id, BOB, patch).await,
        Err(Error::Forbidden)
    ));
    assert!(matches!(
        svc.delete_note(note.id, BOB).await,
        Err(Error::Forbidden)
    ));
    assert!(matches!(
        svc.delete_share(share.id, BOB).await,
        Err(Error::Forbidden)
    ));
    assert!(matches!(
        svc.delete_public_link(link.id, BOB).await,
        Err(Error::Forbidden)
    ));
    // Tokens are credentials: even a grantee cannot list them.
    assert!(matches!(
        svc.list_public_links(note.id, BOB).await,
        Err(Error::Forbidden)
    ));
}

#[tokio::test]
async fn test_multiple_live_links_per_note() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    let first = svc.create_public_link(note.id, ALICE, None).await.unwrap();
    let second = svc.create_public_link(note.id, ALICE, None).await.unwrap();
    assert_ne!(first.token, second.token);

    // Both resolve; deleting one leaves the other live.
    svc.delete_public_link(first.id, ALICE).await.unwrap();
    assert!(matches!(
        svc.resolve_public_token(first.token.as_str()).await,
        Err(Error::NotFound(_))
    ));
    assert!(svc.resolve_public_token(second.token.as_str()).await.is_ok());
}

#[tokio::test]
async fn test_delete_note_cascades_to_grants() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &["todo"]).await.unwrap();
    svc.create_share(note.id, ALICE, BOB).await.unwrap();
    let link = svc.create_public_link(note.id, ALICE, None).await.unwrap();

    svc.delete_note(note.id, ALICE).await.unwrap();

    assert!(matches!(
        svc.get_note(note.id, ALICE).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        svc.resolve_public_token(link.token.as_str()).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_updated_tags_are_normalized_and_searchable() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    let updated = svc
        .update_note(
            note.id,
            ALICE,
            NotePatch {
                tags: Some(["  Rust ", "rust"].iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.tags, ["rust".to_string()].into_iter().collect());

    let page = svc
        .search_notes(
            ALICE,
            &noteward::store::NoteQuery {
                tag: Some("rust".to_string()),
                ..Default::default()
            },
            noteward::PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, note.id);
}

#[tokio::test]
async fn test_search_is_owner_scoped() {
    let svc = service_with_users().await;
    svc.create_note(ALICE, "alpha", "b", &["work"]).await.unwrap();
    svc.create_note(BOB, "alpha", "b", &["work"]).await.unwrap();

    let page = svc
        .search_notes(
            ALICE,
            &noteward::store::NoteQuery {
                text: Some("alpha".to_string()),
                ..Default::default()
            },
            noteward::PageRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    let owner = svc.resolve_principal(ALICE).await.unwrap();
    assert!(page.items.iter().all(|n| n.owner_id == owner.id));
}

#[tokio::test]
async fn test_share_then_link_then_revoke_scenario() {
    // A creates note N (PRIVATE) -> shares with B -> B reads, SHARED ->
    // A mints a public link -> PUBLIC -> A deletes the link -> still
    // PUBLIC -> the deleted token is NotFound.
    let svc = service_with_users().await;

    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();
    assert_eq!(note.visibility, Visibility::Private);

    svc.create_share(note.id, ALICE, BOB).await.unwrap();
    let seen = svc.get_note(note.id, BOB).await.unwrap();
    assert_eq!(seen.visibility, Visibility::Shared);

    let link = svc.create_public_link(note.id, ALICE, None).await.unwrap();
    assert_eq!(
        svc.get_note(note.id, ALICE).await.unwrap().visibility,
        Visibility::Public
    );

    svc.delete_public_link(link.id, ALICE).await.unwrap();
    assert_eq!(
        svc.get_note(note.id, ALICE).await.unwrap().visibility,
        Visibility::Public
    );
    assert!(matches!(
        svc.resolve_public_token(link.token.as_str()).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_links_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noteward.db");

    let token = {
        let svc = Noteward::new(SqliteStore::open(&path).unwrap(), NotewardConfig::default());
        svc.register_user(ALICE).await.unwrap();
        let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();
        let link = svc.create_public_link(note.id, ALICE, None).await.unwrap();
        link.token
    };

    let svc = Noteward::new(SqliteStore::open(&path).unwrap(), NotewardConfig::default());
    assert!(svc.resolve_public_token(token.as_str()).await.is_ok());
}

#[tokio::test]
async fn test_already_expired_link_is_expired_immediately() {
    let svc = service_with_users().await;
    let note = svc.create_note(ALICE, "n", "b", &[]).await.unwrap();

    let link = svc
        .create_public_link(note.id, ALICE, Some(now_millis() - 1_000))
        .await
        .unwrap();
    assert!(matches!(
        svc.resolve_public_token(link.token.as_str()).await,
        Err(Error::Expired)
    ));
}
