use chrono::Duration;
use serde_json::json;

use crate::common::{TestApp, base_time, icpc_contest_body, routes, verdict_body};

/// Live ICPC contest with competitors alice (7, rated) and bob (8).
async fn scored_contest(app: &TestApp) -> i32 {
    let id = app
        .create_contest(&icpc_contest_body("Scored Round", base_time()))
        .await;
    let alice = app.rated_token(7, "alice", "Participant", 2150);
    let res = app
        .post_with_token(&routes::join(id), &json!({"kind": "Competitor"}), &alice)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    app.join_competitor(id, 8, "bob").await;
    id
}

mod ordering {
    use super::*;

    #[tokio::test]
    async fn ranks_by_score_then_penalty() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;
        app.clock.advance(Duration::minutes(51));

        // alice: one wrong then a solve on 101. bob: solves on 101 and 102.
        for (who, problem, verdict, minute) in [
            (7, 101, "WrongAnswer", 10),
            (7, 101, "Accepted", 40),
            (8, 101, "Accepted", 30),
            (8, 102, "Accepted", 50),
        ] {
            let res = app
                .ingest(
                    id,
                    &verdict_body(who, problem, verdict, base_time() + Duration::minutes(minute)),
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let token = app.token(7, "alice", "Participant");
        let res = app.get_with_token(&routes::standings(id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["contest_id"], id);
        assert_eq!(res.body["cutoff"], 4);
        assert_eq!(res.body["frozen"], false);
        assert_eq!(res.body["total_entries"], 2);

        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["rank"], 1);
        assert_eq!(entries[0]["participant_id"], 8);
        assert_eq!(entries[0]["total_score"], 800);
        assert_eq!(entries[0]["total_penalty"], 80);
        assert_eq!(entries[0]["cells"][0]["state"], "Solved");
        assert_eq!(entries[0]["cells"][1]["state"], "Solved");

        assert_eq!(entries[1]["rank"], 2);
        assert_eq!(entries[1]["participant_id"], 7);
        assert_eq!(entries[1]["display_name"], "alice");
        assert_eq!(entries[1]["badge"], "Gold");
        assert_eq!(entries[1]["total_score"], 500);
        // One wrong at 20 minutes a piece, solved at minute 40.
        assert_eq!(entries[1]["total_penalty"], 60);
        assert_eq!(entries[1]["cells"][0]["state"], "SolvedWithPenalty");
        assert_eq!(entries[1]["cells"][0]["attempts"], 2);
        assert_eq!(entries[1]["cells"][1]["state"], "Unattempted");
    }

    #[tokio::test]
    async fn full_ties_break_by_earlier_attainment_then_id() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;
        app.join_competitor(id, 9, "carol").await;
        app.clock.advance(Duration::minutes(45));

        // Identical score and penalty; alice's solve entered the ledger first.
        let at = base_time() + Duration::minutes(40);
        app.ingest(id, &verdict_body(7, 101, "Accepted", at)).await;
        app.ingest(id, &verdict_body(8, 101, "Accepted", at)).await;

        let token = app.token(1, "owner", "Owner");
        let res = app.get_with_token(&routes::standings(id), &token).await;

        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["participant_id"], 7);
        assert_eq!(entries[1]["participant_id"], 8);
        // Scoreless rows close the order by participant id.
        assert_eq!(entries[2]["participant_id"], 9);
        assert_eq!(entries[2]["rank"], 3);
        assert_eq!(entries[2]["total_score"], 0);
    }

    #[tokio::test]
    async fn disqualified_competitors_fold_out_of_the_board() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;
        app.clock.advance(Duration::minutes(31));
        app.ingest(
            id,
            &verdict_body(8, 101, "Accepted", base_time() + Duration::minutes(30)),
        )
        .await;

        let res = app
            .admin(id, &json!({"command": "Disqualify", "participant_id": 8}))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let token = app.token(7, "alice", "Participant");
        let res = app.get_with_token(&routes::standings(id), &token).await;

        assert_eq!(res.body["total_entries"], 1);
        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["participant_id"], 7);
    }

    #[tokio::test]
    async fn spectators_never_hold_a_row() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;
        let viewer = app.token(20, "viewer", "Spectator");
        let res = app
            .post_with_token(&routes::join(id), &json!({"kind": "Spectator"}), &viewer)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app.get_with_token(&routes::standings(id), &viewer).await;

        assert_eq!(res.body["total_entries"], 2);
        for entry in res.body["entries"].as_array().unwrap() {
            assert_ne!(entry["participant_id"], 20);
        }
    }

    #[tokio::test]
    async fn rejudge_rewrites_the_fold() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;
        app.clock.advance(Duration::minutes(31));
        app.ingest(
            id,
            &verdict_body(7, 101, "WrongAnswer", base_time() + Duration::minutes(30)),
        )
        .await;

        let res = app
            .admin(id, &json!({"command": "Rejudge", "seq": 1, "verdict": "Accepted"}))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let token = app.token(7, "alice", "Participant");
        let res = app.get_with_token(&routes::standings(id), &token).await;

        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["participant_id"], 7);
        assert_eq!(entries[0]["total_score"], 500);
        // The correction replaces the wrong, so no attempt penalty remains.
        assert_eq!(entries[0]["total_penalty"], 30);
        assert_eq!(entries[0]["cells"][0]["state"], "Solved");
        assert_eq!(entries[0]["cells"][0]["attempts"], 1);
    }
}

mod freeze_visibility {
    use super::*;

    #[tokio::test]
    async fn frozen_board_clips_for_competitors_not_for_admins() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;
        app.clock.advance(Duration::minutes(30));
        let res = app
            .ingest(
                id,
                &verdict_body(7, 101, "Accepted", base_time() + Duration::minutes(29)),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        // Cross the freeze point, then let bob solve behind the curtain.
        app.clock.advance(Duration::minutes(71));
        let res = app
            .ingest(
                id,
                &verdict_body(8, 102, "Accepted", base_time() + Duration::minutes(100)),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let alice = app.token(7, "alice", "Participant");
        let res = app.get_with_token(&routes::standings(id), &alice).await;
        assert_eq!(res.body["frozen"], true);
        assert_eq!(res.body["cutoff"], 1);
        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["participant_id"], 7);
        assert_eq!(entries[1]["total_score"], 0, "bob's solve must stay hidden");

        // Owner and DualAdmin keep the live board.
        for (actor_id, name, role) in [(1, "owner", "Owner"), (2, "ops", "DualAdmin")] {
            let token = app.token(actor_id, name, role);
            let res = app.get_with_token(&routes::standings(id), &token).await;
            assert_eq!(res.body["frozen"], false, "{role} sees the live board");
            assert_eq!(res.body["cutoff"], 2);
        }

        // Ending the contest lifts the gate for everyone.
        let res = app.admin(id, &json!({"command": "End"})).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let res = app.get_with_token(&routes::standings(id), &alice).await;
        assert_eq!(res.body["frozen"], false);
        assert_eq!(res.body["cutoff"], 2);
        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries[1]["total_score"], 300);
    }

    #[tokio::test]
    async fn freeze_now_pins_the_board_at_the_command() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;
        app.clock.advance(Duration::minutes(11));
        app.ingest(
            id,
            &verdict_body(7, 101, "Accepted", base_time() + Duration::minutes(10)),
        )
        .await;

        let res = app.admin(id, &json!({"command": "FreezeNow"})).await;
        assert_eq!(res.status, 200, "{}", res.text);

        app.clock.advance(Duration::minutes(5));
        app.ingest(
            id,
            &verdict_body(8, 101, "Accepted", base_time() + Duration::minutes(15)),
        )
        .await;

        let token = app.token(8, "bob", "Participant");
        let res = app.get_with_token(&routes::standings(id), &token).await;
        assert_eq!(res.body["frozen"], true);
        assert_eq!(res.body["cutoff"], 1);
    }
}

mod paging_and_pinning {
    use super::*;

    #[tokio::test]
    async fn pinned_cutoff_replays_history() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;
        app.clock.advance(Duration::minutes(41));
        for (verdict, minute) in [("WrongAnswer", 10), ("Accepted", 40)] {
            app.ingest(
                id,
                &verdict_body(7, 101, verdict, base_time() + Duration::minutes(minute)),
            )
            .await;
        }

        let token = app.token(7, "alice", "Participant");
        let res = app
            .get_with_token(&format!("{}?cutoff=1", routes::standings(id)), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["cutoff"], 1);
        // At seq 1 nobody has scored; zero rows order by participant id.
        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["participant_id"], 7);
        assert_eq!(entries[0]["total_score"], 0);
        assert_eq!(entries[0]["cells"][0]["state"], "Attempted");
        assert_eq!(entries[0]["cells"][0]["attempts"], 1);
        assert_eq!(entries[1]["participant_id"], 8);
    }

    #[tokio::test]
    async fn cutoff_beyond_the_head_is_rejected() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;

        let token = app.token(7, "alice", "Participant");
        let res = app
            .get_with_token(&format!("{}?cutoff=99", routes::standings(id)), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn pages_share_one_consistent_view() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;
        app.clock.advance(Duration::minutes(31));
        app.ingest(
            id,
            &verdict_body(7, 101, "Accepted", base_time() + Duration::minutes(20)),
        )
        .await;
        app.ingest(
            id,
            &verdict_body(8, 101, "Accepted", base_time() + Duration::minutes(30)),
        )
        .await;

        let token = app.token(1, "owner", "Owner");
        let res = app
            .get_with_token(&format!("{}?per_page=1&page=1", routes::standings(id)), &token)
            .await;
        assert_eq!(res.body["total_pages"], 2);
        assert_eq!(res.body["entries"][0]["rank"], 1);
        let cutoff = res.body["cutoff"].as_u64().unwrap();

        let res = app
            .get_with_token(
                &format!("{}?per_page=1&page=2&cutoff={cutoff}", routes::standings(id)),
                &token,
            )
            .await;
        assert_eq!(res.body["cutoff"], cutoff);
        assert_eq!(res.body["entries"][0]["rank"], 2);

        // A page past the data is empty, not an error.
        let res = app
            .get_with_token(&format!("{}?per_page=1&page=9", routes::standings(id)), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["entries"].as_array().unwrap().len(), 0);
        assert_eq!(res.body["total_entries"], 2);
    }

    #[tokio::test]
    async fn standings_require_authentication() {
        let app = TestApp::spawn().await;
        let id = scored_contest(&app).await;

        let res = app.get_without_token(&routes::standings(id)).await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn unknown_contest_is_404() {
        let app = TestApp::spawn().await;
        let token = app.token(7, "alice", "Participant");

        let res = app.get_with_token(&routes::standings(999), &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
