mod common;

use common::{exists, put, snapshot, Event, FakeSource, RecordingListener};
use updater_lib::core::sync::{AssetFolder, EntryState, Reconciler};

const MODS: AssetFolder = AssetFolder::Mods;

async fn sync(source: &FakeSource, base: &std::path::Path) -> updater_lib::core::sync::FolderReport {
    let names = {
        use updater_lib::core::sync::AssetSource;
        source.list_files(MODS).await.unwrap()
    };
    Reconciler::new(source).reconcile(MODS, &names, base).await
}

#[tokio::test]
async fn installs_and_retracts_in_one_pass() {
    let dir = tempfile::tempdir().unwrap();
    put(dir.path(), MODS, "mod2.jar", b"old mod");

    let source = FakeSource::new()
        .file(MODS, "mod1.jar", b"fresh mod")
        .listed(MODS, "mod2.rem");

    let report = sync(&source, dir.path()).await;

    assert_eq!(report.installed(), 1);
    assert_eq!(report.removed(), 1);
    assert_eq!(report.errored(), 0);
    assert!(exists(dir.path(), MODS, "mod1.jar"));
    assert!(!exists(dir.path(), MODS, "mod2.jar"));
}

#[tokio::test]
async fn player_sees_one_install_and_one_delete() {
    let dir = tempfile::tempdir().unwrap();
    put(dir.path(), MODS, "mod2.jar", b"old mod");

    let source = FakeSource::new()
        .file(MODS, "mod1.jar", b"fresh mod")
        .listed(MODS, "mod2.rem");
    let listener = RecordingListener::default();

    let reports = Reconciler::new(&source)
        .with_listener(&listener)
        .sync_folders(dir.path(), &[MODS])
        .await;

    assert_eq!(
        listener.events(),
        vec![
            Event::FolderStarted(MODS),
            Event::Installing("mod1.jar".into()),
            Event::Finished("mod1.jar".into(), EntryState::Installed),
            Event::Deleting("mod2.rem".into()),
            Event::Finished("mod2.rem".into(), EntryState::Removed),
        ]
    );
    assert!(reports[0].is_clean());
}

#[tokio::test]
async fn second_pass_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    put(dir.path(), MODS, "gone.zip", b"retired");

    let source = FakeSource::new()
        .file(MODS, "a.jar", b"aaaa")
        .file(MODS, "pack.zip", b"zzzz")
        .listed(MODS, "gone.rem")
        .listed(MODS, "README.txt");

    let first = sync(&source, dir.path()).await;
    assert!(first.mutations() > 0);
    let after_first = snapshot(dir.path(), MODS);

    let second = sync(&source, dir.path()).await;
    assert_eq!(second.mutations(), 0);
    assert_eq!(second.installed() + second.removed(), 0);
    assert_eq!(snapshot(dir.path(), MODS), after_first);
    assert_eq!(source.download_count(), 2);
}

#[tokio::test]
async fn renamed_backup_is_pinned() {
    let dir = tempfile::tempdir().unwrap();
    put(dir.path(), MODS, "x.bak", b"player's copy");

    let source = FakeSource::new().file(MODS, "x.jar", b"server copy");

    let report = sync(&source, dir.path()).await;
    assert_eq!(report.outcomes[0].state, EntryState::Skipped);
    assert!(!exists(dir.path(), MODS, "x.jar"));

    let source = FakeSource::new().listed(MODS, "x.rem");
    let report = sync(&source, dir.path()).await;
    assert_eq!(report.outcomes[0].state, EntryState::Skipped);
    assert!(exists(dir.path(), MODS, "x.bak"));
}

#[tokio::test]
async fn retraction_removes_jar_and_zip() {
    let dir = tempfile::tempdir().unwrap();
    put(dir.path(), MODS, "old.jar", b"j");
    put(dir.path(), MODS, "old.zip", b"z");
    put(dir.path(), MODS, "keep.jar", b"k");

    let source = FakeSource::new().listed(MODS, "old.rem");
    let report = sync(&source, dir.path()).await;

    assert_eq!(report.removed(), 1);
    assert_eq!(snapshot(dir.path(), MODS), vec![("keep.jar".to_string(), 1)]);
}

#[tokio::test]
async fn stale_copy_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    put(dir.path(), MODS, "m.jar", &[0u8; 100]);

    let source = FakeSource::new().file(MODS, "m.jar", &[1u8; 200]);
    let report = sync(&source, dir.path()).await;

    assert_eq!(report.outcomes[0].state, EntryState::Installed);
    assert!(report.outcomes[0].replaced_stale);
    assert_eq!(snapshot(dir.path(), MODS), vec![("m.jar".to_string(), 200)]);
}

#[tokio::test]
async fn fresh_copy_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    put(dir.path(), MODS, "m.jar", &[7u8; 64]);

    let source = FakeSource::new().file(MODS, "m.jar", &[1u8; 64]);
    let report = sync(&source, dir.path()).await;

    assert_eq!(report.outcomes[0].state, EntryState::Skipped);
    assert_eq!(source.download_count(), 0);
    assert_eq!(std::fs::read(dir.path().join("mods/m.jar")).unwrap(), vec![7u8; 64]);
}

#[tokio::test]
async fn unknown_remote_length_keeps_local_file() {
    let dir = tempfile::tempdir().unwrap();
    put(dir.path(), MODS, "m.jar", &[0u8; 10]);

    let source = FakeSource::new()
        .file(MODS, "m.jar", &[0u8; 999])
        .failing_lengths();
    let report = sync(&source, dir.path()).await;

    assert_eq!(report.outcomes[0].state, EntryState::Skipped);
    assert!(!report.outcomes[0].replaced_stale);
    assert_eq!(snapshot(dir.path(), MODS), vec![("m.jar".to_string(), 10)]);
}

#[tokio::test]
async fn traversal_names_never_touch_the_parent() {
    let dir = tempfile::tempdir().unwrap();
    let game = dir.path().join("game");
    std::fs::create_dir_all(&game).unwrap();
    std::fs::write(dir.path().join("evil.jar"), b"outside").unwrap();

    let source = FakeSource::new()
        .listed(MODS, "../evil.jar")
        .listed(MODS, "..\\evil.rem")
        .listed(MODS, "../")
        .listed(MODS, "sub/");
    let report = sync(&source, &game).await;

    assert!(report.outcomes.is_empty());
    assert_eq!(report.rejected.len(), 4);
    assert_eq!(source.download_count(), 0);
    assert_eq!(std::fs::read(dir.path().join("evil.jar")).unwrap(), b"outside");
}

#[tokio::test]
async fn failing_entry_does_not_stop_the_pass() {
    let dir = tempfile::tempdir().unwrap();

    let source = FakeSource::new()
        .file(MODS, "a.jar", b"a")
        .file(MODS, "b.jar", b"b")
        .file(MODS, "c.jar", b"c")
        .failing_download("b.jar");
    let report = sync(&source, dir.path()).await;

    assert_eq!(report.installed(), 2);
    assert_eq!(report.errored(), 1);
    assert!(matches!(report.outcomes[1].state, EntryState::Errored(_)));
    assert!(!exists(dir.path(), MODS, "b.jar"));
    assert!(exists(dir.path(), MODS, "c.jar"));
    assert!(!report.is_clean());
}

#[tokio::test]
async fn ignored_extensions_are_skipped() {
    let dir = tempfile::tempdir().unwrap();

    let source = FakeSource::new()
        .listed(MODS, "notes.txt")
        .listed(MODS, "UPPER.JAR");
    let report = sync(&source, dir.path()).await;

    assert_eq!(report.skipped(), 2);
    assert_eq!(source.download_count(), 0);
}

#[tokio::test]
async fn listing_failure_moves_on_to_the_next_folder() {
    let dir = tempfile::tempdir().unwrap();

    let source = FakeSource::new()
        .file(AssetFolder::ShaderPacks, "bsl.zip", b"shader")
        .failing_listing(AssetFolder::ResourcePacks);
    let reports = Reconciler::new(&source)
        .sync_folders(dir.path(), &AssetFolder::ALL)
        .await;

    assert_eq!(reports.len(), 3);
    assert!(reports[0].is_clean());
    assert!(reports[1].listing_error.is_some());
    assert_eq!(reports[2].installed(), 1);
    assert!(exists(dir.path(), AssetFolder::ShaderPacks, "bsl.zip"));
}
