use chrono::Duration;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

use server::entity::contest;

use crate::common::{TestApp, base_time, icpc_contest_body, routes, verdict_body};

#[tokio::test]
async fn restart_reproduces_identical_standings_and_state() {
    let app = TestApp::spawn().await;
    let id = app
        .create_contest(&icpc_contest_body("Durable Round", base_time()))
        .await;
    let alice = app.rated_token(7, "alice", "Participant", 2150);
    let res = app
        .post_with_token(&routes::join(id), &json!({"kind": "Competitor"}), &alice)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    app.join_competitor(id, 8, "bob").await;

    // A full contest day: wrongs, solves, a pause, an automatic freeze,
    // a post-freeze solve and a rejudge.
    app.clock.advance(Duration::minutes(10));
    let res = app
        .ingest(
            id,
            &verdict_body(7, 101, "WrongAnswer", base_time() + Duration::minutes(10)),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    app.clock.advance(Duration::minutes(30));
    for (who, problem, minute) in [(7, 101, 40), (8, 102, 35)] {
        let res = app
            .ingest(
                id,
                &verdict_body(who, problem, "Accepted", base_time() + Duration::minutes(minute)),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    app.clock.advance(Duration::minutes(10));
    assert_eq!(app.admin(id, &json!({"command": "Pause"})).await.status, 200);
    app.clock.advance(Duration::minutes(10));
    assert_eq!(app.admin(id, &json!({"command": "Resume"})).await.status, 200);

    // The ten paused minutes push the freeze point to minute 110; this
    // ingest crosses it, so the cutoff pins just before the append.
    app.clock.advance(Duration::minutes(51));
    let res = app
        .ingest(
            id,
            &verdict_body(8, 101, "Accepted", base_time() + Duration::minutes(105)),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    let res = app
        .admin(id, &json!({"command": "Rejudge", "seq": 1, "verdict": "Accepted"}))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let owner = app.token(1, "owner", "Owner");
    let live_board = app.get_with_token(&routes::standings(id), &owner).await;
    let frozen_board = app.get_with_token(&routes::standings(id), &alice).await;
    let state = app.get_with_token(&routes::contest_state(id), &alice).await;
    let detail = app.get_with_token(&routes::contest(id), &alice).await;

    assert_eq!(live_board.body["cutoff"], 5);
    assert_eq!(live_board.body["frozen"], false);
    assert_eq!(frozen_board.body["cutoff"], 3);
    assert_eq!(frozen_board.body["frozen"], true);
    assert_eq!(state.body["state"], "FrozenLive");

    // A second server over the same database must answer byte-for-byte
    // the same, the pinned freeze cutoff included.
    let restarted = app.respawn().await;
    let board_again = restarted.get_with_token(&routes::standings(id), &owner).await;
    let frozen_again = restarted.get_with_token(&routes::standings(id), &alice).await;
    let state_again = restarted.get_with_token(&routes::contest_state(id), &alice).await;
    let detail_again = restarted.get_with_token(&routes::contest(id), &alice).await;

    assert_eq!(live_board.body, board_again.body);
    assert_eq!(frozen_board.body, frozen_again.body);
    assert_eq!(state.body, state_again.body);
    assert_eq!(detail.body, detail_again.body);

    // The restored contest keeps accepting commands.
    let res = restarted.admin(id, &json!({"command": "End"})).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["state"], "Ended");
}

#[tokio::test]
async fn restart_resumes_a_scheduled_contest() {
    let app = TestApp::spawn().await;
    let id = app
        .create_contest(&icpc_contest_body(
            "Night Round",
            base_time() + Duration::hours(1),
        ))
        .await;
    app.join_competitor(id, 7, "alice").await;

    let restarted = app.respawn().await;
    let alice = restarted.token(7, "alice", "Participant");

    let res = restarted
        .get_with_token(&routes::contest_state(id), &alice)
        .await;
    assert_eq!(res.body["state"], "Scheduled");
    assert_eq!(res.body["remaining_seconds"], 3600);

    // The clock passing the scheduled start is enough; no command needed.
    restarted.clock.advance(Duration::minutes(65));
    let res = restarted
        .get_with_token(&routes::contest_state(id), &alice)
        .await;
    assert_eq!(res.body["state"], "Live");
    assert_eq!(res.body["remaining_seconds"], 6900);

    let res = restarted
        .ingest(
            id,
            &verdict_body(
                7,
                101,
                "Accepted",
                base_time() + Duration::minutes(65),
            ),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["seq"], 1);
    assert_eq!(res.body["elapsed_s"], 300);
}

#[tokio::test]
async fn corrupt_rows_halt_only_that_contest() {
    let app = TestApp::spawn().await;
    let healthy = app
        .create_contest(&icpc_contest_body("Healthy Round", base_time()))
        .await;
    let doomed = app
        .create_contest(&icpc_contest_body("Doomed Round", base_time()))
        .await;

    // A percentage no config could produce; restore refuses to map it.
    let poison = contest::ActiveModel {
        id: Set(doomed),
        decay_floor_pct: Set(999),
        ..Default::default()
    };
    poison.update(&app.db).await.expect("poison contest row");

    let restarted = app.respawn().await;
    let owner = restarted.token(1, "owner", "Owner");

    let res = restarted
        .get_with_token(&routes::contest_state(healthy), &owner)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["state"], "Live");
    let res = restarted
        .get_with_token(&routes::standings(healthy), &owner)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    // Every operation on the halted contest reports the quarantine.
    let res = restarted
        .get_with_token(&routes::contest_state(doomed), &owner)
        .await;
    assert_eq!(res.status, 503);
    assert_eq!(res.body["code"], "CONTEST_HALTED");
    let res = restarted
        .get_with_token(&routes::standings(doomed), &owner)
        .await;
    assert_eq!(res.status, 503);
    let res = restarted.admin(doomed, &json!({"command": "Pause"})).await;
    assert_eq!(res.status, 503);
    let viewer = restarted.token(20, "viewer", "Spectator");
    let res = restarted
        .post_with_token(&routes::join(doomed), &json!({"kind": "Spectator"}), &viewer)
        .await;
    assert_eq!(res.status, 503);

    // The stored definition stays readable; only the derived state is gone.
    let res = restarted.get_with_token(&routes::contest(doomed), &owner).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["title"], "Doomed Round");
    assert!(res.body["state"].is_null(), "{}", res.text);

    let res = restarted.get_with_token(routes::CONTESTS, &owner).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    for item in data {
        if item["id"] == doomed {
            assert!(item["state"].is_null());
        } else {
            assert_eq!(item["id"], healthy);
            assert_eq!(item["state"], "Live");
        }
    }
}
