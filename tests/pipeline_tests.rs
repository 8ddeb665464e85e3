#![allow(clippy::unwrap_used)]

mod test_utils;

use chrono::NaiveDate;
use parking_lot::Mutex;
use release_scribe::credentials::Credentials;
use release_scribe::dispatch::ProxiedDispatcher;
use release_scribe::error::ReleaseNotesError;
use release_scribe::github::{ProxiedGateway, RepoVisibility};
use release_scribe::pipeline::{ReleaseNotesPipeline, Stage, Submission};
use release_scribe::providers::Model;
use release_scribe::server::{AppState, router};
use release_scribe::types::{NoteItem, SourceType};
use std::sync::Arc;
use test_utils::{StubBackend, StubGateway};

fn submission(source_type: SourceType) -> Submission {
    Submission {
        repository_url: "https://github.com/acme/widgets".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
        source_type,
        model: Model::Gpt4oMini,
    }
}

fn openai_key() -> Credentials {
    Credentials {
        openai_api_key: Some("sk-openai".to_string()),
        ..Credentials::default()
    }
}

fn pipeline(gateway: &Arc<StubGateway>, backend: &Arc<StubBackend>) -> ReleaseNotesPipeline {
    ReleaseNotesPipeline::new(gateway.clone(), backend.clone())
}

#[tokio::test]
async fn test_commits_submission_produces_notes() {
    let gateway = Arc::new(StubGateway::default());
    let backend = Arc::new(StubBackend::replying("## Features\n- dark mode"));
    let stages = Mutex::new(Vec::new());

    let notes = pipeline(&gateway, &backend)
        .run_with_progress(&submission(SourceType::Commits), &openai_key(), |stage| {
            stages.lock().push(stage);
        })
        .await
        .unwrap();

    assert_eq!(notes.raw_content(), "## Features\n- dark mode");
    assert_eq!(gateway.calls(), ["visibility", "commits"]);

    let requests = backend.requests.lock();
    assert_eq!(requests[0].source_type, SourceType::Commits);
    assert_eq!(
        requests[0].items,
        [
            NoteItem::message("feat: add dark mode"),
            NoteItem::message("fix: null check")
        ]
    );

    let stages = stages.lock();
    assert_eq!(stages.len(), 3);
    assert!(matches!(stages[0], Stage::CheckingVisibility(_)));
    assert_eq!(
        stages[2],
        Stage::Generating {
            items: 2,
            model: Model::Gpt4oMini
        }
    );
}

#[tokio::test]
async fn test_diffs_submission_uses_diff_fetch() {
    let gateway = Arc::new(StubGateway::default());
    let backend = Arc::new(StubBackend::replying("notes"));

    pipeline(&gateway, &backend)
        .run(&submission(SourceType::Diffs), &openai_key())
        .await
        .unwrap();

    assert_eq!(gateway.calls(), ["visibility", "diffs"]);
    assert_eq!(
        backend.requests.lock()[0].items,
        [NoteItem::with_diff("feat: add dark mode", "+theme = dark")]
    );
}

#[tokio::test]
async fn test_missing_dates_fail_before_network() {
    let gateway = Arc::new(StubGateway::default());
    let backend = Arc::new(StubBackend::replying("notes"));
    let input = Submission {
        end_date: None,
        repository_url: "not a url".to_string(),
        ..submission(SourceType::Commits)
    };

    let error = pipeline(&gateway, &backend)
        .run(&input, &openai_key())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ReleaseNotesError::Validation("Please select both start and end dates".to_string())
    );
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_url_fails_before_network() {
    let gateway = Arc::new(StubGateway::default());
    let backend = Arc::new(StubBackend::replying("notes"));
    let input = Submission {
        repository_url: "https://gitlab.com/acme/widgets".to_string(),
        ..submission(SourceType::Commits)
    };

    let error = pipeline(&gateway, &backend)
        .run(&input, &openai_key())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ReleaseNotesError::Validation("Invalid GitHub repository URL".to_string())
    );
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_local_backend_requires_model_key() {
    let gateway = Arc::new(StubGateway::default());
    let backend = Arc::new(StubBackend::replying("notes"));
    let input = Submission {
        model: Model::Claude,
        ..submission(SourceType::Commits)
    };

    let error = pipeline(&gateway, &backend)
        .run(&input, &openai_key())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ReleaseNotesError::Validation(
            "Please provide your Anthropic API key (ANTHROPIC_API_KEY)".to_string()
        )
    );
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_remote_backend_skips_local_key_check() {
    let gateway = Arc::new(StubGateway::default());
    let backend = Arc::new(StubBackend::replying("notes").remote());

    let notes = pipeline(&gateway, &backend)
        .run(&submission(SourceType::Commits), &Credentials::default())
        .await
        .unwrap();

    assert_eq!(notes.raw_content(), "notes");
}

#[tokio::test]
async fn test_private_repo_without_token_stops_before_fetch() {
    let gateway = Arc::new(StubGateway {
        visibility: RepoVisibility::failed(
            true,
            "Repository not found. It might be private and require authentication.",
        ),
        ..StubGateway::default()
    });
    let backend = Arc::new(StubBackend::replying("notes"));

    let error = pipeline(&gateway, &backend)
        .run(&submission(SourceType::Commits), &openai_key())
        .await
        .unwrap_err();

    assert_eq!(error, ReleaseNotesError::PrivateRepoAuthRequired);
    assert_eq!(gateway.calls(), ["visibility"]);
    assert!(backend.requests.lock().is_empty());
}

#[tokio::test]
async fn test_private_repo_with_token_proceeds() {
    let gateway = Arc::new(StubGateway {
        visibility: RepoVisibility::private(),
        ..StubGateway::default()
    });
    let backend = Arc::new(StubBackend::replying("notes"));
    let credentials = Credentials {
        github_token: Some("ghp_test".to_string()),
        ..openai_key()
    };

    pipeline(&gateway, &backend)
        .run(&submission(SourceType::Commits), &credentials)
        .await
        .unwrap();

    assert_eq!(gateway.calls(), ["visibility", "commits"]);
    assert_eq!(
        gateway.seen_tokens.lock()[1].as_deref(),
        Some("ghp_test")
    );
}

#[tokio::test]
async fn test_visibility_error_is_surfaced() {
    let gateway = Arc::new(StubGateway {
        visibility: RepoVisibility::failed(false, "GitHub API error: Internal Server Error"),
        ..StubGateway::default()
    });
    let backend = Arc::new(StubBackend::replying("notes"));

    let error = pipeline(&gateway, &backend)
        .run(&submission(SourceType::Commits), &openai_key())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ReleaseNotesError::VisibilityCheck("GitHub API error: Internal Server Error".to_string())
    );
}

#[tokio::test]
async fn test_empty_window_is_reported() {
    let gateway = Arc::new(StubGateway {
        commits: Vec::new(),
        ..StubGateway::default()
    });
    let backend = Arc::new(StubBackend::replying("notes"));

    let error = pipeline(&gateway, &backend)
        .run(&submission(SourceType::Commits), &openai_key())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ReleaseNotesError::Validation("No commits found in the selected date range".to_string())
    );
    assert!(backend.requests.lock().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_propagates() {
    let gateway = Arc::new(StubGateway {
        fetch_error: Some(ReleaseNotesError::Fetch("Forbidden".to_string())),
        ..StubGateway::default()
    });
    let backend = Arc::new(StubBackend::replying("notes"));

    let error = pipeline(&gateway, &backend)
        .run(&submission(SourceType::Diffs), &openai_key())
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "GitHub API error: Forbidden");
}

async fn spawn_proxy(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

fn proxied_pipeline(base_url: &str) -> ReleaseNotesPipeline {
    let http = reqwest::Client::new();
    ReleaseNotesPipeline::new(
        Arc::new(ProxiedGateway::new(http.clone(), base_url)),
        Arc::new(ProxiedDispatcher::new(http, base_url)),
    )
}

#[tokio::test]
async fn test_proxied_round_trip_produces_notes() {
    let gateway = Arc::new(StubGateway::default());
    let backend = Arc::new(StubBackend::replying("## Proxied notes"));
    let base_url = spawn_proxy(AppState::new(
        gateway.clone(),
        backend.clone(),
        Credentials::default(),
    ))
    .await;

    let notes = proxied_pipeline(&base_url)
        .run(&submission(SourceType::Diffs), &openai_key())
        .await
        .unwrap();

    assert_eq!(notes.raw_content(), "## Proxied notes");
    assert_eq!(gateway.calls(), ["visibility", "diffs"]);
    assert_eq!(
        backend.credentials.lock()[0].openai_api_key.as_deref(),
        Some("sk-openai")
    );
}

#[tokio::test]
async fn test_proxied_token_limit_keeps_its_kind() {
    let base_url = spawn_proxy(AppState::new(
        Arc::new(StubGateway::default()),
        Arc::new(StubBackend::failing(ReleaseNotesError::token_limit())),
        Credentials::default(),
    ))
    .await;

    let error = proxied_pipeline(&base_url)
        .run(&submission(SourceType::Commits), &Credentials::default())
        .await
        .unwrap_err();

    assert_eq!(error, ReleaseNotesError::token_limit());
}

#[tokio::test]
async fn test_proxied_private_repo_requires_token() {
    // Without any token the proxy only sees GitHub's 404
    let base_url = spawn_proxy(AppState::new(
        Arc::new(StubGateway {
            visibility: RepoVisibility::failed(
                true,
                "Repository not found. It might be private and require authentication.",
            ),
            ..StubGateway::default()
        }),
        Arc::new(StubBackend::replying("notes")),
        Credentials::default(),
    ))
    .await;

    let error = proxied_pipeline(&base_url)
        .run(&submission(SourceType::Commits), &Credentials::default())
        .await
        .unwrap_err();

    assert_eq!(error, ReleaseNotesError::PrivateRepoAuthRequired);
}

#[tokio::test]
async fn test_proxied_private_repo_uses_server_token() {
    let gateway = Arc::new(StubGateway {
        visibility: RepoVisibility::private(),
        ..StubGateway::default()
    });
    let base_url = spawn_proxy(AppState::new(
        gateway.clone(),
        Arc::new(StubBackend::replying("notes")),
        Credentials {
            github_token: Some("ghp_server".to_string()),
            ..Credentials::default()
        },
    ))
    .await;

    let notes = proxied_pipeline(&base_url)
        .run(&submission(SourceType::Commits), &Credentials::default())
        .await
        .unwrap();

    assert_eq!(notes.raw_content(), "notes");
    assert_eq!(gateway.calls(), ["visibility", "commits"]);
    assert_eq!(gateway.seen_tokens.lock()[1].as_deref(), Some("ghp_server"));
}

#[tokio::test]
async fn test_private_metadata_without_token_stops_direct_runs() {
    let gateway = Arc::new(StubGateway {
        visibility: RepoVisibility::private(),
        ..StubGateway::default()
    });
    let backend = Arc::new(StubBackend::replying("notes"));

    let error = pipeline(&gateway, &backend)
        .run(&submission(SourceType::Commits), &openai_key())
        .await
        .unwrap_err();

    assert_eq!(error, ReleaseNotesError::PrivateRepoAuthRequired);
    assert_eq!(gateway.calls(), ["visibility"]);
}
