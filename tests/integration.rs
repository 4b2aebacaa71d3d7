//! End-to-end tests over the core services: sandboxed file operations,
//! credential handling, and the session token lifecycle.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use cloudfiles_server::auth::session::now_millis;
use cloudfiles_server::auth::{CredentialVault, Credentials, SessionManager};
use cloudfiles_server::db::{Database, MemoryDb};
use cloudfiles_server::error::{AuthError, FileError};
use cloudfiles_server::storage::FileStore;
use cloudfiles_server::{ServerConfig, ServerContext};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_config(tmp: &TempDir) -> ServerConfig {
    ServerConfig {
        data_directory: tmp.path().join("data").to_string_lossy().into_owned(),
        database_path: tmp.path().join("users.db").to_string_lossy().into_owned(),
        ..ServerConfig::default()
    }
}

fn memory_context() -> (TempDir, ServerContext, Arc<MemoryDb>) {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let db = Arc::new(MemoryDb::new());
    let context =
        ServerContext::with_database(test_config(&tmp), Arc::clone(&db) as Arc<dyn Database>)
            .unwrap();
    (tmp, context, db)
}

fn file_store() -> (TempDir, FileStore) {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let store = FileStore::new(tmp.path().join("data")).unwrap();
    (tmp, store)
}

fn session_fixture(window: Duration) -> (Arc<MemoryDb>, CredentialVault, SessionManager) {
    init_logging();
    let db = Arc::new(MemoryDb::new());
    let vault = CredentialVault::new(Arc::clone(&db) as Arc<dyn Database>);
    let manager = SessionManager::new(
        Arc::clone(&db) as Arc<dyn Database>,
        vault.clone(),
        window,
    );
    (db, vault, manager)
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

#[test]
fn working_directory_starts_at_root() {
    let (_tmp, store) = file_store();
    assert_eq!(store.current_dir(), ".");
}

#[test]
fn create_then_read_round_trips_bytes() {
    let (_tmp, store) = file_store();
    let payload = b"some binary \x00\xff payload".to_vec();

    let created = store.create_file("a.bin", &payload).unwrap();
    assert_eq!(created.name, "./a.bin");
    assert_eq!(created.size, payload.len() as u64);
    assert!(created.modify_date.is_none());

    let read = store.read_file("a.bin").unwrap();
    assert_eq!(read.content, payload);
    assert_eq!(read.metadata.size, payload.len() as u64);
    assert!(read.metadata.modify_date.is_some());
}

#[test]
fn create_overwrites_existing_file() {
    let (_tmp, store) = file_store();
    store.create_file("note.txt", b"first").unwrap();
    let meta = store.create_file("note.txt", b"second version").unwrap();
    assert_eq!(meta.size, 14);
    assert_eq!(store.read_file("note.txt").unwrap().content, b"second version");
}

#[test]
fn change_dir_with_autocreate_is_idempotent() {
    let (tmp, store) = file_store();

    let first = store.change_dir("complex/dir", true).unwrap();
    let second = store.change_dir("complex/dir", true).unwrap();
    assert_eq!(first, "./complex/dir");
    assert_eq!(first, second);
    assert!(tmp.path().join("data/complex/dir").is_dir());
    assert_eq!(store.current_dir(), "./complex/dir");
}

#[test]
fn change_dir_without_autocreate_reports_not_found() {
    let (_tmp, store) = file_store();
    match store.change_dir("aNewDir", false) {
        Err(FileError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    // The pointer must not have moved.
    assert_eq!(store.current_dir(), ".");
}

#[test]
fn change_dir_onto_a_file_is_invalid() {
    let (_tmp, store) = file_store();
    store.create_file("blob", b"x").unwrap();
    assert!(matches!(
        store.change_dir("blob", true),
        Err(FileError::InvalidPath(_))
    ));
}

#[test]
fn non_recursive_delete_of_occupied_dir_is_refused() {
    let (tmp, store) = file_store();
    store.change_dir("proj", true).unwrap();
    store.create_file("keep.txt", b"data").unwrap();

    assert!(matches!(
        store.delete_dir("proj", false),
        Err(FileError::NotEmpty(_))
    ));
    assert!(tmp.path().join("data/proj/keep.txt").is_file());

    store.delete_dir("proj", true).unwrap();
    assert!(!tmp.path().join("data/proj").exists());
}

#[test]
fn deleting_the_working_directory_relocates_the_pointer() {
    let (_tmp, store) = file_store();
    store.change_dir("a/b", true).unwrap();
    store.delete_dir("a", true).unwrap();
    assert_eq!(store.current_dir(), ".");

    store.change_dir("x/y", true).unwrap();
    store.delete_dir("x/y", true).unwrap();
    assert_eq!(store.current_dir(), "./x");
}

#[test]
fn delete_dir_of_absent_path_reports_not_found() {
    let (_tmp, store) = file_store();
    assert!(matches!(
        store.delete_dir("nowhere", true),
        Err(FileError::NotFound(_))
    ));
}

#[test]
fn delete_file_of_absent_file_reports_not_found() {
    let (_tmp, store) = file_store();
    assert!(matches!(
        store.delete_file("non_existing_file"),
        Err(FileError::NotFound(_))
    ));
}

#[test]
fn read_file_of_absent_file_reports_not_found() {
    let (_tmp, store) = file_store();
    assert!(matches!(
        store.read_file("non_existing_file"),
        Err(FileError::NotFound(_))
    ));
}

#[test]
fn sandbox_refuses_unsafe_paths_everywhere() {
    let (_tmp, store) = file_store();
    let long_component = "a".repeat(300);
    let unsafe_paths = [
        "..",
        "../escape",
        "nested/../../escape",
        ":a",
        "a:b",
        "bad\0name",
        long_component.as_str(),
        "/etc/passwd",
        "   ",
    ];

    for path in unsafe_paths {
        assert!(
            matches!(store.create_file(path, b"x"), Err(FileError::InvalidPath(_))),
            "create_file accepted {:?}",
            path
        );
        assert!(
            matches!(store.read_file(path), Err(FileError::InvalidPath(_))),
            "read_file accepted {:?}",
            path
        );
        assert!(
            matches!(store.delete_file(path), Err(FileError::InvalidPath(_))),
            "delete_file accepted {:?}",
            path
        );
        assert!(
            matches!(store.change_dir(path, true), Err(FileError::InvalidPath(_))),
            "change_dir accepted {:?}",
            path
        );
        assert!(
            matches!(store.delete_dir(path, true), Err(FileError::InvalidPath(_))),
            "delete_dir accepted {:?}",
            path
        );
    }
}

#[test]
fn list_files_skips_subdirectories_and_names_are_root_relative() {
    let (_tmp, store) = file_store();
    store.change_dir("proj", true).unwrap();
    store.create_file("one.bin", b"1").unwrap();
    store.create_file("two.bin", b"22").unwrap();
    store.change_dir("proj/sub", true).unwrap();
    store.change_dir("proj", true).unwrap();

    let listing = store.list_files().unwrap();
    assert_eq!(listing.len(), 2);

    let mut names: Vec<&str> = listing.iter().map(|m| m.name.as_str()).collect();
    names.sort();
    assert_eq!(names, ["./proj/one.bin", "./proj/two.bin"]);
}

#[test]
fn file_operations_are_safe_under_concurrent_callers() {
    let (_tmp, store) = file_store();
    let store = Arc::new(store);

    thread::scope(|scope| {
        for i in 0..8 {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                let name = format!("file-{i}.bin");
                store.create_file(&name, &[i as u8; 16]).unwrap();
                let read = store.read_file(&name).unwrap();
                assert_eq!(read.content, vec![i as u8; 16]);
            });
        }
    });

    assert_eq!(store.list_files().unwrap().len(), 8);
}

// ---------------------------------------------------------------------------
// Credentials and sessions
// ---------------------------------------------------------------------------

#[test]
fn login_issues_token_and_touches_last_login() {
    let (db, vault, manager) = session_fixture(Duration::from_secs(60));
    assert!(vault.register("alice", "pw").unwrap());

    let token = manager.login("alice", "pw").unwrap();
    assert!(!token.is_empty());

    let user = db.find_user_by_name("alice").unwrap().unwrap();
    assert!(user.last_login.is_some());
    assert!(manager.authenticate(&Credentials::Token(token)).unwrap());
}

#[test]
fn login_with_bad_credentials_fails_without_a_session() {
    let (db, vault, manager) = session_fixture(Duration::from_secs(60));
    vault.register("alice", "pw").unwrap();

    assert!(matches!(
        manager.login("alice", "wrong"),
        Err(AuthError::AuthFailed)
    ));
    assert!(matches!(
        manager.login("nobody", "pw"),
        Err(AuthError::AuthFailed)
    ));
    assert_eq!(db.session_count(), 0);
}

#[test]
fn unknown_tokens_authenticate_false() {
    let (_db, _vault, manager) = session_fixture(Duration::from_secs(60));
    assert!(
        !manager
            .authenticate(&Credentials::Token("no-such-token".into()))
            .unwrap()
    );
}

#[test]
fn token_renewal_strictly_increases_expiry() {
    let (db, _vault, manager) = session_fixture(Duration::from_secs(10));
    let user_id = db.insert_user("alice", "$salt$digest").unwrap();

    // A session one second from expiring.
    let original_expiry = now_millis() + 1_000;
    db.insert_session(user_id, "tok", original_expiry).unwrap();

    assert!(manager.authenticate(&Credentials::Token("tok".into())).unwrap());

    let renewed = db.find_session_by_token("tok").unwrap().unwrap();
    assert!(renewed.expires > original_expiry);
}

#[test]
fn expired_sessions_are_reaped_on_next_use() {
    let (db, vault, manager) = session_fixture(Duration::from_millis(50));
    vault.register("carol", "pw").unwrap();

    let token = manager.login("carol", "pw").unwrap();
    assert_eq!(db.session_count(), 1);

    thread::sleep(Duration::from_millis(200));

    let credentials = Credentials::Token(token.clone());
    assert!(!manager.authenticate(&credentials).unwrap());
    assert!(db.find_session_by_token(&token).unwrap().is_none());
    assert_eq!(db.session_count(), 0);

    // Terminal: the token stays dead.
    assert!(!manager.authenticate(&credentials).unwrap());
}

#[test]
fn frequent_use_keeps_a_session_alive() {
    let (_db, vault, manager) = session_fixture(Duration::from_millis(400));
    vault.register("dave", "pw").unwrap();
    let credentials = Credentials::Token(manager.login("dave", "pw").unwrap());

    // Each use lands well inside the window and slides it forward.
    for _ in 0..4 {
        thread::sleep(Duration::from_millis(100));
        assert!(manager.authenticate(&credentials).unwrap());
    }
}

#[test]
fn basic_credentials_verify_but_mint_no_session() {
    let (db, vault, manager) = session_fixture(Duration::from_secs(60));
    vault.register("erin", "pw").unwrap();

    assert!(manager
        .authenticate(&Credentials::Basic {
            username: "erin".into(),
            password: "pw".into(),
        })
        .unwrap());
    assert!(!manager
        .authenticate(&Credentials::Basic {
            username: "erin".into(),
            password: "wrong".into(),
        })
        .unwrap());
    assert_eq!(db.session_count(), 0);
}

// ---------------------------------------------------------------------------
// Whole-context scenarios
// ---------------------------------------------------------------------------

#[test]
fn register_login_and_manage_files_end_to_end() {
    let (_tmp, context, _db) = memory_context();

    assert!(context.vault.register("bob", "secret").unwrap());
    assert!(!context.vault.register("bob", "anything").unwrap());

    let token = context.sessions.login("bob", "secret").unwrap();
    assert!(context
        .sessions
        .authenticate(&Credentials::Token(token))
        .unwrap());

    assert_eq!(context.files.change_dir("proj", true).unwrap(), "./proj");

    let created = context.files.create_file("a.txt", b"hi").unwrap();
    assert_eq!(created.size, 2);
    assert_eq!(created.name, "./proj/a.txt");

    let listing = context.files.list_files().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "./proj/a.txt");

    context.files.delete_file("a.txt").unwrap();
    assert!(context.files.list_files().unwrap().is_empty());
}

#[test]
fn sqlite_backed_context_works_end_to_end() {
    init_logging();
    let tmp = tempfile::tempdir().unwrap();
    let context = ServerContext::new(test_config(&tmp)).unwrap();

    assert!(context.vault.register("alice", "pw").unwrap());
    let token = context.sessions.login("alice", "pw").unwrap();
    assert!(context
        .sessions
        .authenticate(&Credentials::Token(token))
        .unwrap());

    context.files.create_file("hello.txt", b"hello").unwrap();
    assert_eq!(context.files.read_file("hello.txt").unwrap().content, b"hello");
}
