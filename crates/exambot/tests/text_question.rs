
use exambot::completion::NO_ANSWER;
use exambot::commands::ONBOARDING_REPLY;
use exambot::handlers::{self, APOLOGY_REPLY, Outcome, UNSUPPORTED_REPLY};
use exambot::Error;
use fixtures::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_help_gets_onboarding_reply() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    forbid_upstream(&server).await;
    Mock::given(method("POST"))
        .and(path(send_message_path()))
        .and(body_partial_json(json!({
            "chat_id": CHAT_ID,
            "text": ONBOARDING_REPLY,
            "reply_to_message_id": MESSAGE_ID,
            "parse_mode": "Markdown"
        })))
        .respond_with(telegram_ok())
        .expect(1)
        .mount(&server)
        .await;

    let context = context(&server, dir.path());
    let outcome = handlers::handle_webhook_body(&context, &body(&text_update("help")))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Command(_)));
}

#[tokio::test]
async fn test_start_command_gets_onboarding_reply() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    forbid_upstream(&server).await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    handlers::handle_webhook_body(&context, &body(&text_update("/start")))
        .await
        .unwrap();

    let sent = sent_messages(&server).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["text"], ONBOARDING_REPLY);
}

#[tokio::test]
async fn test_text_question_is_sent_verbatim() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(header("authorization", format!("Bearer {COMPLETION_KEY}").as_str()))
        .and(body_partial_json(json!({
            "modelUri": "gpt://folder/yandexgpt-lite",
            "completionOptions": {"stream": false, "maxTokens": "1500"},
            "messages": [
                {"role": "system", "text": SYSTEM_PROMPT},
                {"role": "user", "text": "Что такое процесс?"}
            ]
        })))
        .respond_with(completion_response("Процесс это программа в исполнении."))
        .expect(1)
        .mount(&server)
        .await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    let outcome = handlers::handle_webhook_body(&context, &body(&text_update("Что такое процесс?")))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Answered);
    let sent = sent_messages(&server).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["chat_id"], CHAT_ID);
    assert_eq!(sent[0]["reply_to_message_id"], MESSAGE_ID);
    assert_eq!(sent[0]["text"], "Процесс это программа в исполнении.");
}

#[tokio::test]
async fn test_command_with_suffix_is_a_question() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(completion_response("answer"))
        .expect(1)
        .mount(&server)
        .await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    let outcome = handlers::handle_webhook_body(&context, &body(&text_update("/help me")))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Answered);
}

#[tokio::test]
async fn test_empty_alternatives_send_sentinel() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"alternatives": [], "modelVersion": "23.10.2024"}
        })))
        .mount(&server)
        .await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    handlers::handle_webhook_body(&context, &body(&text_update("question")))
        .await
        .unwrap();

    let sent = sent_messages(&server).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["text"], NO_ANSWER);
}

#[tokio::test]
async fn test_completion_failure_sends_apology() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    let outcome = handlers::handle_webhook_body(&context, &body(&text_update("question")))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Answered);
    let sent = sent_messages(&server).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["text"], APOLOGY_REPLY);
}

#[tokio::test]
async fn test_undecodable_completion_sends_apology() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    handlers::handle_webhook_body(&context, &body(&text_update("question")))
        .await
        .unwrap();

    assert_eq!(sent_messages(&server).await[0]["text"], APOLOGY_REPLY);
}

#[tokio::test]
async fn test_long_answer_is_split() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let answer = "я".repeat(5000);
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(completion_response(&answer))
        .mount(&server)
        .await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    handlers::handle_webhook_body(&context, &body(&text_update("question")))
        .await
        .unwrap();

    let sent = sent_messages(&server).await;
    assert_eq!(sent.len(), 2);
    let first = sent[0]["text"].as_str().unwrap();
    let second = sent[1]["text"].as_str().unwrap();
    assert_eq!(first.chars().count(), 4096);
    assert_eq!(second.chars().count(), 904);
    assert_eq!(format!("{first}{second}"), answer);
    for message in &sent {
        assert_eq!(message["chat_id"], CHAT_ID);
        assert_eq!(message["reply_to_message_id"], MESSAGE_ID);
    }
}

#[tokio::test]
async fn test_same_update_gets_same_reply() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let answer = format!("Дедлок: {}", "ресурс ".repeat(700));
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .respond_with(completion_response(&answer))
        .expect(2)
        .mount(&server)
        .await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    let update = body(&text_update("Что такое взаимоблокировка?"));
    handlers::handle_webhook_body(&context, &update).await.unwrap();
    let first: Vec<_> = sent_messages(&server).await;
    handlers::handle_webhook_body(&context, &update).await.unwrap();
    let all = sent_messages(&server).await;

    let (first_run, second_run) = all.split_at(first.len());
    assert_eq!(first_run, first.as_slice());
    assert_eq!(first_run.len(), second_run.len());
    for (a, b) in first_run.iter().zip(second_run) {
        assert_eq!(a["text"].as_str().unwrap().as_bytes(), b["text"].as_str().unwrap().as_bytes());
        assert_eq!(a["chat_id"], b["chat_id"]);
        assert_eq!(a["reply_to_message_id"], b["reply_to_message_id"]);
    }
}

#[tokio::test]
async fn test_message_without_text_or_photo_is_unsupported() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    forbid_upstream(&server).await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    let outcome = handlers::handle_webhook_body(&context, &body(&sticker_update()))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Unsupported);
    let sent = sent_messages(&server).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["text"], UNSUPPORTED_REPLY);
}

#[tokio::test]
async fn test_empty_text_is_unsupported() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    forbid_upstream(&server).await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    let outcome = handlers::handle_webhook_body(&context, &body(&text_update("")))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Unsupported);
    assert_eq!(sent_messages(&server).await[0]["text"], UNSUPPORTED_REPLY);
}

#[tokio::test]
async fn test_update_without_message_is_ignored() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    forbid_upstream(&server).await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    let outcome = handlers::handle_webhook_body(&context, br#"{"update_id": 5}"#)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Ignored);
    assert!(sent_messages(&server).await.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    forbid_upstream(&server).await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    let err = handlers::handle_webhook_body(&context, b"{not json")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Parse { .. }));
    assert!(sent_messages(&server).await.is_empty());
}

#[tokio::test]
async fn test_send_failure_is_returned() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path(send_message_path()))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#),
        )
        .mount(&server)
        .await;

    let context = context(&server, dir.path());
    let err = handlers::handle_webhook_body(&context, &body(&text_update("/help")))
        .await
        .unwrap_err();

    match err {
        Error::Request { status, body, .. } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("can't parse entities"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_prompt_file_uses_builtin_prompt() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "text": exambot::prompt::default_system_prompt()},
                {"role": "user", "text": "question"}
            ]
        })))
        .respond_with(completion_response("answer"))
        .expect(1)
        .mount(&server)
        .await;
    mount_send_message(&server).await;

    let context = context(&server, dir.path());
    std::fs::remove_file(dir.path().join("system_prompt.md")).unwrap();
    handlers::handle_webhook_body(&context, &body(&text_update("question")))
        .await
        .unwrap();

    assert_eq!(sent_messages(&server).await[0]["text"], "answer");
}
