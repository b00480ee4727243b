use chrono::Duration;
use serde_json::json;

use crate::common::{TestApp, base_time, icpc_contest_body, routes, verdict_body};

/// Live contest with competitors alice (7) and bob (8).
async fn live_contest(app: &TestApp) -> i32 {
    let id = app
        .create_contest(&icpc_contest_body("Judged Round", base_time()))
        .await;
    app.join_competitor(id, 7, "alice").await;
    app.join_competitor(id, 8, "bob").await;
    id
}

mod ingestion {
    use super::*;

    #[tokio::test]
    async fn judge_verdict_is_sealed_into_the_ledger() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;
        app.clock.advance(Duration::minutes(41));

        let res = app
            .ingest(
                id,
                &verdict_body(7, 101, "Accepted", base_time() + Duration::minutes(40)),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["contest_id"], id);
        assert_eq!(res.body["seq"], 1);
        assert_eq!(res.body["participant_id"], 7);
        assert_eq!(res.body["problem_id"], 101);
        assert_eq!(res.body["verdict"], "Accepted");
        assert_eq!(res.body["elapsed_s"], 2400);
        assert!(res.body["fraction"].is_null());
        assert!(res.body["supersedes"].is_null());
    }

    #[tokio::test]
    async fn sequence_numbers_are_gap_free() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;
        app.clock.advance(Duration::minutes(30));

        for (seq, minute) in [(1, 5), (2, 12), (3, 25)] {
            let res = app
                .ingest(
                    id,
                    &verdict_body(7, 101, "WrongAnswer", base_time() + Duration::minutes(minute)),
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
            assert_eq!(res.body["seq"], seq);
        }
    }

    #[tokio::test]
    async fn only_ingest_roles_may_push_verdicts() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;
        app.clock.advance(Duration::minutes(10));
        let body = verdict_body(7, 101, "Accepted", base_time() + Duration::minutes(5));

        for (actor_id, name, role) in
            [(7, "alice", "Participant"), (5, "setter", "QuestionAdmin"), (20, "viewer", "Spectator")]
        {
            let token = app.token(actor_id, name, role);
            let res = app.post_with_token(&routes::verdicts(id), &body, &token).await;
            assert_eq!(res.status, 403, "{role} should be denied");
            assert_eq!(res.body["code"], "PERMISSION_DENIED");
        }

        let res = app.post_without_token(&routes::verdicts(id), &body).await;
        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn unknown_targets_are_404() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;
        app.clock.advance(Duration::minutes(10));
        let at = base_time() + Duration::minutes(5);

        let res = app.ingest(999, &verdict_body(7, 101, "Accepted", at)).await;
        assert_eq!(res.status, 404, "unknown contest: {}", res.text);

        let res = app.ingest(id, &verdict_body(7, 999, "Accepted", at)).await;
        assert_eq!(res.status, 404, "unknown problem: {}", res.text);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let res = app.ingest(id, &verdict_body(55, 101, "Accepted", at)).await;
        assert_eq!(res.status, 404, "unknown participant: {}", res.text);
    }

    #[tokio::test]
    async fn spectators_are_not_verdict_targets() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;
        let token = app.token(20, "viewer", "Spectator");
        let res = app
            .post_with_token(&routes::join(id), &json!({"kind": "Spectator"}), &token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        app.clock.advance(Duration::minutes(10));

        let res = app
            .ingest(
                id,
                &verdict_body(20, 101, "Accepted", base_time() + Duration::minutes(5)),
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn scheduled_contest_rejects_verdicts() {
        let app = TestApp::spawn().await;
        let id = app
            .create_contest(&icpc_contest_body("Not Yet", base_time() + Duration::hours(1)))
            .await;
        app.join_competitor(id, 7, "alice").await;

        let res = app
            .ingest(id, &verdict_body(7, 101, "Accepted", base_time()))
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "SUBMISSION_REJECTED");
    }

    #[tokio::test]
    async fn submission_time_before_the_start_is_outside_the_window() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;
        app.clock.advance(Duration::minutes(10));

        let res = app
            .ingest(
                id,
                &verdict_body(7, 101, "Accepted", base_time() - Duration::seconds(1)),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "SUBMISSION_REJECTED");
    }

    #[tokio::test]
    async fn fraction_travels_only_with_partial_verdicts() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;
        app.clock.advance(Duration::minutes(10));
        let at = base_time() + Duration::minutes(5);

        // Partial without a fraction.
        let res = app.ingest(id, &verdict_body(7, 101, "Partial", at)).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        // Fraction out of range.
        let mut body = verdict_body(7, 101, "Partial", at);
        body["fraction"] = json!(1.5);
        let res = app.ingest(id, &body).await;
        assert_eq!(res.status, 400);

        // Fraction on a non-partial verdict.
        let mut body = verdict_body(7, 101, "Accepted", at);
        body["fraction"] = json!(0.5);
        let res = app.ingest(id, &body).await;
        assert_eq!(res.status, 400);

        // And the valid shape is admitted.
        let mut body = verdict_body(7, 101, "Partial", at);
        body["fraction"] = json!(0.6);
        let res = app.ingest(id, &body).await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["fraction"], 0.6);
    }

    #[tokio::test]
    async fn malformed_bodies_are_rejected_as_validation_errors() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;

        let res = app
            .ingest(id, &json!({"participant_id": "not-a-number"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod rejudging {
    use super::*;

    #[tokio::test]
    async fn question_admin_appends_a_correction() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;
        app.clock.advance(Duration::minutes(31));
        let res = app
            .ingest(
                id,
                &verdict_body(7, 101, "WrongAnswer", base_time() + Duration::minutes(30)),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let setter = app.token(5, "setter", "QuestionAdmin");
        let res = app
            .post_with_token(
                &routes::admin(id),
                &json!({"command": "Rejudge", "seq": 1, "verdict": "Accepted"}),
                &setter,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let correction = &res.body["correction"];
        assert_eq!(correction["seq"], 2);
        assert_eq!(correction["supersedes"], 1);
        assert_eq!(correction["verdict"], "Accepted");
        assert_eq!(correction["participant_id"], 7);
        // A rejudge corrects the verdict, never the clock.
        assert_eq!(correction["elapsed_s"], 1800);
    }

    #[tokio::test]
    async fn rejudging_an_unknown_record_is_404() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;

        let res = app
            .admin(id, &json!({"command": "Rejudge", "seq": 9, "verdict": "Accepted"}))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn corrections_are_not_rejudge_targets() {
        let app = TestApp::spawn().await;
        let id = live_contest(&app).await;
        app.clock.advance(Duration::minutes(31));
        app.ingest(
            id,
            &verdict_body(7, 101, "WrongAnswer", base_time() + Duration::minutes(30)),
        )
        .await;
        let res = app
            .admin(
                id,
                &json!({"command": "Rejudge", "seq": 1, "verdict": "Partial", "fraction": 0.5}),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["correction"]["fraction"], 0.5);

        // Seq 2 is the correction itself; its root is the only valid target.
        let res = app
            .admin(id, &json!({"command": "Rejudge", "seq": 2, "verdict": "Accepted"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
