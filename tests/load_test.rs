//! Concurrent load through the proxy. Requests are independent, so every one
//! of them must come back intact.

use std::time::{Duration, Instant};

use serde_json::{json, Value};

mod common;
use common::{local_config, start_proxy, start_stub_backend, StubResponse};

#[tokio::test]
async fn test_load_performance() {
    // 1. Setup stub backend and proxy
    let backend = start_stub_backend(StubResponse::ok("Hello from backend")).await;
    let proxy = start_proxy(local_config()).await;

    // 2. Run load test
    let concurrency = 20;
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;

    let client = reqwest::Client::new();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for task_id in 0..concurrency {
        let client = client.clone();
        let endpoint = proxy.endpoint();
        let target = backend.url(&format!("/task/{task_id}"));
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for _ in 0..requests_per_task {
                let req_start = Instant::now();
                let res = client
                    .post(&endpoint)
                    .json(&json!({"url": target, "method": "GET", "headers": []}))
                    .send()
                    .await;
                let Ok(res) = res else { continue };
                if !res.status().is_success() {
                    continue;
                }
                let Ok(body) = res.json::<Value>().await else { continue };
                if body["status"] == 200 && body["body"] == "Hello from backend" {
                    latencies.push(req_start.elapsed());
                }
            }
            latencies
        }));
    }

    let mut all_latencies: Vec<Duration> = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }

    let duration = start.elapsed();
    let rps = total_requests as f64 / duration.as_secs_f64();

    assert_eq!(all_latencies.len(), total_requests, "some requests failed");
    assert_eq!(backend.hits(), total_requests);

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p95 = all_latencies[(all_latencies.len() as f64 * 0.95) as usize];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", rps);
    println!("P50 Latency:    {:?}", p50);
    println!("P95 Latency:    {:?}", p95);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");
}
