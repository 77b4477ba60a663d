mod common;

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{
        RECIPIENT, SENDER_PHONE_ID, TOKEN, provider_settings, wedding_parameters,
    };
    use assert_matches::assert_matches;
    use reqwest::StatusCode;
    use serde_json::json;
    use showup_sender::dispatcher::{DispatchError, DispatchOutcome, WhatsAppDispatcher};
    use showup_sender::template::TemplateParameters;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn messages_path() -> String {
        format!("/v17.0/{}/messages", SENDER_PHONE_ID)
    }

    fn dispatcher(mock_server: &MockServer) -> WhatsAppDispatcher {
        WhatsAppDispatcher::new(provider_settings(&mock_server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_send_success() {
        let mock_server = MockServer::start().await;

        let expected_body = json!({
            "messaging_product": "whatsapp",
            "to": RECIPIENT,
            "type": "template",
            "template": {
                "name": "wedding_simple",
                "language": { "code": "he" },
                "components": [{
                    "type": "body",
                    "parameters": [
                        {"type": "text", "text": "5 בנובמבר 2024"},
                        {"type": "text", "text": "19:30"},
                        {"type": "text", "text": "גן האירועים"},
                        {"type": "text", "text": "עומר ושני"}
                    ]
                }]
            }
        });

        Mock::given(method("POST"))
            .and(path(messages_path()))
            .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
            .and(header("content-type", "application/json"))
            .and(body_json(expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messaging_product": "whatsapp",
                "contacts": [{"input": RECIPIENT, "wa_id": RECIPIENT}],
                "messages": [{"id": "wamid.HBgMOTcyNTI1NDAxNjg2"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = dispatcher(&mock_server)
            .send(SENDER_PHONE_ID, RECIPIENT, "wedding_simple", "he", &wedding_parameters())
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.message_ids(), vec!["wamid.HBgMOTcyNTI1NDAxNjg2"]);
    }

    #[tokio::test]
    async fn test_send_rejections_are_reported_not_raised() {
        for status in [400u16, 401, 404, 500] {
            let mock_server = MockServer::start().await;
            let error_body = format!(r#"{{"error":{{"message":"status {}"}}}}"#, status);

            Mock::given(method("POST"))
                .and(path(messages_path()))
                .respond_with(ResponseTemplate::new(status).set_body_string(error_body.clone()))
                .expect(1)
                .mount(&mock_server)
                .await;

            let outcome = dispatcher(&mock_server)
                .send(SENDER_PHONE_ID, RECIPIENT, "wedding_simple", "he", &wedding_parameters())
                .await
                .unwrap();

            assert_eq!(
                outcome,
                DispatchOutcome::Rejected {
                    status: StatusCode::from_u16(status).unwrap(),
                    body: error_body,
                }
            );
        }
    }

    #[tokio::test]
    async fn test_only_200_counts_as_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"messages": []})))
            .mount(&mock_server)
            .await;

        let outcome = dispatcher(&mock_server)
            .send(SENDER_PHONE_ID, RECIPIENT, "t", "he", &TemplateParameters::new())
            .await
            .unwrap();

        assert_matches!(outcome, DispatchOutcome::Rejected { status, .. } if status == StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = dispatcher(&mock_server)
            .send(SENDER_PHONE_ID, RECIPIENT, "t", "he", &TemplateParameters::new())
            .await
            .unwrap();

        assert!(!outcome.is_success());
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_each_send_issues_one_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(3)
            .mount(&mock_server)
            .await;

        let dispatcher = dispatcher(&mock_server);
        for _ in 0..3 {
            dispatcher
                .send(SENDER_PHONE_ID, RECIPIENT, "t", "he", &TemplateParameters::new())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_success_with_unreadable_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = dispatcher(&mock_server)
            .send(SENDER_PHONE_ID, RECIPIENT, "t", "he", &TemplateParameters::new())
            .await;

        assert_matches!(result, Err(DispatchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_send_timeout_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let mut settings = provider_settings(&mock_server.uri());
        settings.request_timeout = Some(Duration::from_millis(200));

        let result = WhatsAppDispatcher::new(settings)
            .unwrap()
            .send(SENDER_PHONE_ID, RECIPIENT, "t", "he", &TemplateParameters::new())
            .await;

        let error = result.unwrap_err();
        assert!(error.is_timeout());
        assert_matches!(error, DispatchError::Transport(_));
    }

    #[tokio::test]
    async fn test_send_unreachable_provider() {
        // Nothing listens on the discard port
        let dispatcher = WhatsAppDispatcher::new(provider_settings("http://127.0.0.1:9")).unwrap();

        let result = dispatcher
            .send(SENDER_PHONE_ID, RECIPIENT, "t", "he", &TemplateParameters::new())
            .await;

        assert_matches!(result, Err(DispatchError::Transport(_)));
    }
}
