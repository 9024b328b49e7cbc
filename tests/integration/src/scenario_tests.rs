//! End-to-end scenarios for a data directory under version control
//!
//! Each module walks one flow an embedding application goes through:
//! initialize, save changes in transactions, inspect history.

use vault_git::{AuthorConfiguration, Repository, TransactionState};
use vault_test_utils::{TestDir, git};

fn author() -> AuthorConfiguration {
    AuthorConfiguration::new("Planner", "planner@example.com")
}

mod s1_first_run {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn s1_1_empty_directory_to_initial_commit() {
        let dir = TestDir::new();
        let repo = Repository::initialize(dir.root(), author()).unwrap();
        assert!(repo.get_history(0).unwrap().is_empty());

        dir.write("tasks.json", "[]");
        dir.write("themes.json", "[]");
        dir.write("calendar/2024.json", "{}");

        let mut tx = repo.begin().unwrap();
        tx.stage(&["."]).unwrap();
        let id = tx.commit("Initial data").unwrap();

        let history = repo.get_history(0).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, id);
        assert_eq!(history[0].author, "Planner");
        assert!(repo.status().unwrap().is_clean());
        assert_eq!(git::head_file(dir.root(), "calendar/2024.json").as_deref(), Some("{}"));
    }

    #[test]
    fn s1_2_nothing_to_save_yet() {
        let dir = TestDir::new();
        let repo = Repository::initialize(dir.root(), author()).unwrap();

        let mut tx = repo.begin().unwrap();
        let err = tx.stage(&["."]).unwrap_err();
        assert!(matches!(err, vault_git::Error::StagingNoMatch { .. }));
        tx.cancel().unwrap();

        assert_eq!(tx.state(), TransactionState::Canceled);
        assert_eq!(git::commit_count(dir.root()), 0);
    }
}

mod s2_daily_use {
    use super::*;
    use pretty_assertions::assert_eq;

    fn saved(dir: &TestDir, repo: &Repository, file: &str, json: serde_json::Value, msg: &str) -> String {
        dir.write(file, &serde_json::to_string_pretty(&json).unwrap());
        let mut tx = repo.begin().unwrap();
        tx.stage(&[file]).unwrap();
        tx.commit(msg).unwrap()
    }

    #[test]
    fn s2_1_edits_show_up_in_file_history_and_diff() {
        let dir = TestDir::new();
        let repo = Repository::initialize(dir.root(), author()).unwrap();

        let first = saved(&dir, &repo, "tasks.json", serde_json::json!([{"title": "Write"}]), "Add task");
        saved(&dir, &repo, "themes.json", serde_json::json!(["Health"]), "Add theme");
        let third = saved(
            &dir,
            &repo,
            "tasks.json",
            serde_json::json!([{"title": "Write", "done": true}]),
            "Complete task",
        );

        let file_history: Vec<_> = repo
            .get_file_history("tasks.json", 0)
            .unwrap()
            .into_iter()
            .map(|c| c.message)
            .collect();
        assert_eq!(file_history, vec!["Complete task".to_string(), "Add task".to_string()]);

        let diff = String::from_utf8(repo.get_file_differences(&first, &third).unwrap()).unwrap();
        assert!(diff.contains("tasks.json"));
        assert!(diff.contains("+    \"done\": true"), "{diff}");
        assert!(diff.contains("b/themes.json"));
    }

    #[test]
    fn s2_2_abandoned_edit_leaves_history_untouched() {
        let dir = TestDir::new();
        let repo = Repository::initialize(dir.root(), author()).unwrap();
        saved(&dir, &repo, "tasks.json", serde_json::json!([]), "Empty tasks");

        dir.write("tasks.json", "[\"draft\"]");
        {
            let mut tx = repo.begin().unwrap();
            tx.stage(&["tasks.json"]).unwrap();
        }

        assert_eq!(git::commit_count(dir.root()), 1);
        assert!(repo.status().unwrap().staged_files.is_empty());
        dir.assert_file_contains("tasks.json", "draft");
    }

    #[test]
    fn s2_3_stream_walks_same_history_lazily() {
        let dir = TestDir::new();
        let repo = Repository::initialize(dir.root(), author()).unwrap();
        for day in 1..=5 {
            saved(&dir, &repo, "journal.json", serde_json::json!({ "day": day }), &format!("Day {day}"));
        }

        let latest_two: Vec<_> = repo
            .history_stream()
            .unwrap()
            .take(2)
            .map(|c| c.unwrap().message)
            .collect();
        assert_eq!(latest_two, vec!["Day 5".to_string(), "Day 4".to_string()]);
        assert_eq!(git::parent_counts(dir.root()), vec![1, 1, 1, 1, 0]);
    }
}

mod s3_restart {
    use super::*;
    use pretty_assertions::assert_eq;
    use vault_git::VaultConfig;

    #[test]
    fn s3_1_config_and_history_survive_reopen() {
        let dir = TestDir::new();
        let config_path = dir.path("settings/vault.yaml");
        VaultConfig::new(author()).save(&config_path).unwrap();

        {
            let config = VaultConfig::load(&config_path).unwrap();
            let repo = Repository::initialize_with_config(dir.path("data"), &config).unwrap();
            dir.write("data/goals.json", "[]");
            let mut tx = repo.begin().unwrap();
            tx.stage(&["goals.json"]).unwrap();
            tx.commit("Goals").unwrap();
            repo.close();
        }

        let config = VaultConfig::load(&config_path).unwrap();
        let repo = Repository::initialize_with_config(dir.path("data"), &config).unwrap();
        let history = repo.get_history(0).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].email, "planner@example.com");
        assert!(repo.begin().is_ok());
    }
}
