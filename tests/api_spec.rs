use std::future::Future;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use speculate2::speculate;
use tempfile::TempDir;

use train::api::{create_router, AppState};
use train::db::Database;

struct Harness {
    server: TestServer,
    dir: std::sync::Arc<TempDir>,
}

impl Harness {
    fn legacy_path(&self) -> std::path::PathBuf {
        self.dir.path().join("train.json")
    }

    async fn create_exercise(&self, name: &str, kind: &str) -> i64 {
        let response = self
            .server
            .post("/api/exercises")
            .json(&json!({ "name": name, "type": kind }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().unwrap()
    }

    async fn record(&self, exercise_id: i64, date: &str, weight: f64) -> Value {
        let response = self
            .server
            .post("/api/history")
            .json(&json!({
                "exercise_id": exercise_id,
                "session_date": date,
                "weight": weight,
                "sets_completed": [8, 8, 8],
                "completed": true,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    async fn pr_count(&self, exercise_id: i64) -> usize {
        let body = self
            .server
            .get(&format!("/api/history/{exercise_id}"))
            .await
            .json::<Value>();
        body["history"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|entry| entry["is_pr"] == json!(true))
            .count()
    }

    async fn schedule(&self, exercise_id: i64, day: &str) -> i64 {
        let response = self
            .server
            .post("/api/routines")
            .json(&json!({ "exercise_id": exercise_id, "day_of_week": day }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().unwrap()
    }

    async fn day_order(&self, day: &str) -> Vec<(i64, i64)> {
        let body = self.server.get(&format!("/api/routines/{day}")).await.json::<Value>();
        body["exercises"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| (e["routine_id"].as_i64().unwrap(), e["order_index"].as_i64().unwrap()))
            .collect()
    }
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().join("public");
    std::fs::create_dir(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<h1>train</h1>").unwrap();

    let db = Database::open_memory().unwrap();
    db.migrate().unwrap();

    let state = AppState::new(db, dir.path().join("train.json"), static_dir);
    let server = TestServer::new(create_router(state)).unwrap();
    Harness { server, dir: std::sync::Arc::new(dir) }
}

fn run<F, Fut>(test: F)
where
    F: FnOnce(Harness) -> Fut,
    Fut: Future<Output = ()>,
{
    tokio_test::block_on(async move {
        let h = harness();
        // Keep the temp dir alive for the whole test, whatever fields the body captures.
        let _dir = h.dir.clone();
        test(h).await
    })
}

speculate! {
    describe "exercises" {
        it "creates and fetches an exercise" {
            run(|h| async move {
                let response = h
                    .server
                    .post("/api/exercises")
                    .json(&json!({
                        "name": "Bench Press",
                        "type": "weight",
                        "category": "Arms-Push",
                        "target_sets": 3,
                        "target_reps": 8,
                    }))
                    .await;
                response.assert_status(StatusCode::CREATED);
                let body = response.json::<Value>();
                assert_eq!(body["message"], "Exercise created successfully");

                let id = body["id"].as_i64().unwrap();
                let exercise = h.server.get(&format!("/api/exercises/{id}")).await.json::<Value>();
                assert_eq!(exercise["name"], "Bench Press");
                assert_eq!(exercise["type"], "weight");
                assert_eq!(exercise["category"], "Arms-Push");
                assert_eq!(exercise["target_reps"], 8);
            });
        }

        it "rejects a duplicate name with a conflict" {
            run(|h| async move {
                h.create_exercise("Squat", "weight").await;

                let response = h
                    .server
                    .post("/api/exercises")
                    .json(&json!({ "name": "Squat", "type": "bodyweight" }))
                    .await;
                response.assert_status(StatusCode::CONFLICT);
                assert_eq!(response.text(), "Exercise with this name already exists");

                let list = h.server.get("/api/exercises").await.json::<Value>();
                assert_eq!(list["exercises"].as_array().unwrap().len(), 1);
            });
        }

        it "validates required fields and enumerations" {
            run(|h| async move {
                let missing = h.server.post("/api/exercises").json(&json!({ "type": "weight" })).await;
                missing.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(missing.text(), "Name and type are required");

                let bad_type = h
                    .server
                    .post("/api/exercises")
                    .json(&json!({ "name": "Row", "type": "machine" }))
                    .await;
                bad_type.assert_status(StatusCode::BAD_REQUEST);

                let bad_category = h
                    .server
                    .post("/api/exercises")
                    .json(&json!({ "name": "Row", "type": "weight", "category": "Back" }))
                    .await;
                bad_category.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(bad_category.text(), "Invalid category");
            });
        }

        it "answers malformed bodies with 400" {
            run(|h| async move {
                let response = h.server.post("/api/exercises").text("{not json").await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(response.text(), "Invalid request body");
            });
        }

        it "distinguishes bad ids from missing exercises" {
            run(|h| async move {
                let bad = h.server.get("/api/exercises/abc").await;
                bad.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(bad.text(), "Invalid exercise ID");

                h.server.get("/api/exercises/999").await.assert_status(StatusCode::NOT_FOUND);
                h.server.delete("/api/exercises/999").await.assert_status(StatusCode::NOT_FOUND);
            });
        }

        it "patches only the provided fields" {
            run(|h| async move {
                let id = h.create_exercise("Leg Press", "weight").await;

                let empty = h.server.put(&format!("/api/exercises/{id}")).json(&json!({})).await;
                empty.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(empty.text(), "No fields to update");

                h.server
                    .put(&format!("/api/exercises/{id}"))
                    .json(&json!({ "target_weight": 120.5, "category": "Legs-Push" }))
                    .await
                    .assert_status_ok();

                let exercise = h.server.get(&format!("/api/exercises/{id}")).await.json::<Value>();
                assert_eq!(exercise["name"], "Leg Press");
                assert_eq!(exercise["target_weight"], 120.5);
                assert_eq!(exercise["category"], "Legs-Push");

                h.server
                    .put(&format!("/api/exercises/{id}"))
                    .json(&json!({ "category": "" }))
                    .await
                    .assert_status_ok();
                let cleared = h.server.get(&format!("/api/exercises/{id}")).await.json::<Value>();
                assert!(cleared.get("category").is_none());
            });
        }

        it "filters by type" {
            run(|h| async move {
                h.create_exercise("Squat", "weight").await;
                h.create_exercise("Push Up", "bodyweight").await;

                let body = h.server.get("/api/exercises?type=bodyweight").await.json::<Value>();
                let names: Vec<_> = body["exercises"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|e| e["name"].as_str().unwrap().to_string())
                    .collect();
                assert_eq!(names, vec!["Push Up"]);
            });
        }

        it "returns 405 for unsupported methods" {
            run(|h| async move {
                let response = h.server.delete("/api/exercises").await;
                response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
                assert_eq!(response.text(), "Method not allowed");
            });
        }
    }

    describe "history and personal records" {
        it "moves the record to each strictly heavier session" {
            run(|h| async move {
                let id = h.create_exercise("Deadlift", "weight").await;

                assert_eq!(h.record(id, "2026-02-01", 100.0).await["is_pr"], true);
                assert_eq!(h.record(id, "2026-02-03", 90.0).await["is_pr"], false);
                assert_eq!(h.record(id, "2026-02-05", 100.0).await["is_pr"], false);
                assert_eq!(h.record(id, "2026-02-07", 110.0).await["is_pr"], true);
                assert_eq!(h.pr_count(id).await, 1);

                let pr = h.server.get(&format!("/api/history/{id}/pr")).await.json::<Value>();
                assert_eq!(pr["pr"]["weight"], 110.0);
                assert_eq!(pr["pr"]["date"], "2026-02-07");
            });
        }

        it "treats lighter sessions as records for assisted exercises" {
            run(|h| async move {
                let id = h.create_exercise("Assisted Pull Up", "assisted").await;

                assert_eq!(h.record(id, "2026-02-01", 40.0).await["is_pr"], true);
                assert_eq!(h.record(id, "2026-02-02", 40.0).await["is_pr"], false);
                assert_eq!(h.record(id, "2026-02-03", 45.0).await["is_pr"], false);
                assert_eq!(h.record(id, "2026-02-04", 30.0).await["is_pr"], true);
                assert_eq!(h.pr_count(id).await, 1);
            });
        }

        it "keeps records of different exercises independent" {
            run(|h| async move {
                let squat = h.create_exercise("Squat", "weight").await;
                let bench = h.create_exercise("Bench Press", "weight").await;

                h.record(squat, "2026-02-01", 100.0).await;
                assert_eq!(h.record(bench, "2026-02-01", 60.0).await["is_pr"], true);
                assert_eq!(h.record(squat, "2026-02-02", 120.0).await["is_pr"], true);

                assert_eq!(h.pr_count(squat).await, 1);
                assert_eq!(h.pr_count(bench).await, 1);
            });
        }

        it "rejects a second session on the same date" {
            run(|h| async move {
                let id = h.create_exercise("Squat", "weight").await;
                h.record(id, "2026-02-01", 100.0).await;

                let response = h
                    .server
                    .post("/api/history")
                    .json(&json!({
                        "exercise_id": id,
                        "session_date": "2026-02-01",
                        "weight": 105.0,
                        "sets_completed": [5],
                    }))
                    .await;
                response.assert_status(StatusCode::CONFLICT);
            });
        }

        it "requires sets and a valid date" {
            run(|h| async move {
                let id = h.create_exercise("Squat", "weight").await;

                h.server
                    .post("/api/history")
                    .json(&json!({ "exercise_id": id, "session_date": "2026-02-01", "sets_completed": [] }))
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);

                h.server
                    .post("/api/history")
                    .json(&json!({ "exercise_id": id, "session_date": "yesterday", "sets_completed": [5] }))
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);

                h.server
                    .post("/api/history")
                    .json(&json!({ "exercise_id": 999, "session_date": "2026-02-01", "sets_completed": [5] }))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            });
        }

        it "reports no record before any weighted session" {
            run(|h| async move {
                let id = h.create_exercise("Plank", "bodyweight").await;
                let pr = h.server.get(&format!("/api/history/{id}/pr")).await.json::<Value>();
                assert_eq!(pr, json!({ "pr": null }));
            });
        }

        it "hands the record back when the best session is deleted" {
            run(|h| async move {
                let id = h.create_exercise("Squat", "weight").await;
                h.record(id, "2026-02-01", 100.0).await;
                let best = h.record(id, "2026-02-02", 120.0).await["id"].as_i64().unwrap();

                h.server
                    .delete(&format!("/api/history/{best}"))
                    .await
                    .assert_status_ok();

                let pr = h.server.get(&format!("/api/history/{id}/pr")).await.json::<Value>();
                assert_eq!(pr["pr"]["weight"], 100.0);
            });
        }
    }

    describe "routines" {
        it "lists every day of the week" {
            run(|h| async move {
                let body = h.server.get("/api/routines").await.json::<Value>();
                assert_eq!(body["days"].as_array().unwrap().len(), 7);
            });
        }

        it "appends routines and reports when they were last done" {
            run(|h| async move {
                let squat = h.create_exercise("Squat", "weight").await;
                let bench = h.create_exercise("Bench Press", "weight").await;
                h.schedule(squat, "Monday").await;
                h.schedule(bench, "Monday").await;
                h.record(squat, "2026-02-02", 100.0).await;

                let plan = h.server.get("/api/routines/Monday").await.json::<Value>();
                assert_eq!(plan["day"], "Monday");
                let exercises = plan["exercises"].as_array().unwrap();
                assert_eq!(exercises[0]["name"], "Squat");
                assert_eq!(exercises[0]["last_done"], "2026-02-02");
                assert_eq!(exercises[1]["order_index"], 1);
                assert!(exercises[1].get("last_done").is_none());
            });
        }

        it "reorders a day's routines" {
            run(|h| async move {
                let a = h.schedule(h.create_exercise("Squat", "weight").await, "Tuesday").await;
                let b = h.schedule(h.create_exercise("Lunge", "weight").await, "Tuesday").await;

                h.server
                    .post("/api/routines/reorder")
                    .json(&json!({ "day_of_week": "Tuesday", "routine_ids": [b, a] }))
                    .await
                    .assert_status_ok();

                assert_eq!(h.day_order("Tuesday").await, vec![(b, 0), (a, 1)]);
            });
        }

        it "leaves the order untouched when any id does not belong to the day" {
            run(|h| async move {
                let a = h.schedule(h.create_exercise("Squat", "weight").await, "Tuesday").await;
                let b = h.schedule(h.create_exercise("Lunge", "weight").await, "Tuesday").await;
                let other = h.schedule(h.create_exercise("Row", "weight").await, "Friday").await;

                h.server
                    .post("/api/routines/reorder")
                    .json(&json!({ "day_of_week": "Tuesday", "routine_ids": [b, other, a] }))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);

                assert_eq!(h.day_order("Tuesday").await, vec![(a, 0), (b, 1)]);
            });
        }

        it "rejects unknown days and exercises" {
            run(|h| async move {
                let bad_day = h.server.get("/api/routines/Funday").await;
                bad_day.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(bad_day.text(), "Invalid day of week");

                h.server
                    .post("/api/routines")
                    .json(&json!({ "exercise_id": 999, "day_of_week": "Monday" }))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            });
        }

        it "removes routines together with their exercise" {
            run(|h| async move {
                let id = h.create_exercise("Squat", "weight").await;
                h.schedule(id, "Monday").await;

                h.server.delete(&format!("/api/exercises/{id}")).await.assert_status_ok();
                assert!(h.day_order("Monday").await.is_empty());
            });
        }
    }

    describe "day titles" {
        it "stores and returns a title" {
            run(|h| async move {
                h.server
                    .put("/api/days/Wednesday")
                    .json(&json!({ "title": "Upper body" }))
                    .await
                    .assert_status_ok();

                let day = h.server.get("/api/days/Wednesday").await.json::<Value>();
                assert_eq!(day, json!({ "day_of_week": "Wednesday", "title": "Upper body" }));

                let all = h.server.get("/api/days").await.json::<Value>();
                assert_eq!(all["days"].as_array().unwrap().len(), 7);
            });
        }
    }

    describe "metrics" {
        it "starts with the default metric types" {
            run(|h| async move {
                let body = h.server.get("/api/metrics").await.json::<Value>();
                let names: Vec<_> = body["metric_types"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|m| m["name"].as_str().unwrap().to_string())
                    .collect();
                assert_eq!(names, vec!["Body Weight", "Body Fat", "Waist"]);
            });
        }

        it "records entries and serves them newest first" {
            run(|h| async move {
                let created = h
                    .server
                    .post("/api/metrics")
                    .json(&json!({ "name": "Biceps", "unit": "cm", "color": "#ff0000" }))
                    .await;
                created.assert_status(StatusCode::CREATED);
                let id = created.json::<Value>()["id"].as_i64().unwrap();

                for (date, value) in [("2026-01-01", 35.0), ("2026-01-08", 35.5), ("2026-01-15", 36.0)] {
                    h.server
                        .post("/api/metric-entries")
                        .json(&json!({ "metric_type_id": id, "entry_date": date, "value": value }))
                        .await
                        .assert_status(StatusCode::CREATED);
                }

                let body = h
                    .server
                    .get(&format!("/api/metrics/{id}/entries?limit=2"))
                    .await
                    .json::<Value>();
                let entries = body["entries"].as_array().unwrap();
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0]["value"], 36.0);

                let list = h.server.get("/api/metrics").await.json::<Value>();
                let biceps = list["metric_types"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .find(|m| m["id"] == json!(id))
                    .unwrap()
                    .clone();
                assert_eq!(biceps["latest_entry"]["value"], 36.0);
            });
        }

        it "refuses to delete a default metric type" {
            run(|h| async move {
                let body = h.server.get("/api/metrics").await.json::<Value>();
                let id = body["metric_types"][0]["id"].as_i64().unwrap();

                h.server
                    .delete(&format!("/api/metrics/{id}"))
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            });
        }

        it "rejects a duplicate metric name" {
            run(|h| async move {
                h.server
                    .post("/api/metrics")
                    .json(&json!({ "name": "Waist", "unit": "in", "color": "#000000" }))
                    .await
                    .assert_status(StatusCode::CONFLICT);
            });
        }

        it "builds a dashboard with every metric type" {
            run(|h| async move {
                let body = h.server.get("/api/metrics/dashboard?days=7").await.json::<Value>();
                let metrics = body["metrics"].as_array().unwrap();
                assert_eq!(metrics.len(), 3);
                assert!(metrics.iter().all(|m| m["entries"].as_array().unwrap().is_empty()));
            });
        }
    }

    describe "training file" {
        it "is missing until something is saved" {
            run(|h| async move {
                h.server.get("/api/training").await.assert_status(StatusCode::NOT_FOUND);

                let plan = json!({ "Monday": { "title": "Legs", "exercises": [] } });
                h.server.post("/api/training").json(&plan).await.assert_status_ok();

                let saved = h.server.get("/api/training").await.json::<Value>();
                assert_eq!(saved, plan);
                assert!(h.legacy_path().exists());
            });
        }

        it "only accepts a JSON object" {
            run(|h| async move {
                h.server
                    .post("/api/training")
                    .json(&json!([1, 2, 3]))
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            });
        }
    }

    describe "static files" {
        it "serves the client from the static directory" {
            run(|h| async move {
                let response = h.server.get("/index.html").await;
                response.assert_status_ok();
                assert!(response.text().contains("train"));
            });
        }
    }
}
