//! Request and response shaping benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linguix_gateway::config::Settings;
use linguix_gateway::models::chat::{ChatCompletion, ChatMessage, ChatRequest};
use linguix_gateway::models::gemini::GenerateContentResponse;
use linguix_gateway::models::records::SaveProgressRequest;
use linguix_gateway::services::GeminiClient;
use serde_json::{json, Value};

fn create_message_request(prompt_len: usize) -> ChatRequest {
    ChatRequest {
        messages: Some(vec![ChatMessage::user("a".repeat(prompt_len))]),
        ..Default::default()
    }
}

fn create_contents_request(turns: usize) -> ChatRequest {
    let contents = (0..turns)
        .map(|i| {
            let role = if i % 2 == 0 { "user" } else { "model" };
            json!({"role": role, "parts": [{"text": format!("Turn {} of the conversation", i)}]})
        })
        .collect();

    ChatRequest {
        contents: Some(contents),
        ..Default::default()
    }
}

fn upstream_reply() -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "Assalam-o-Alaikum! ".repeat(20)}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 80, "totalTokenCount": 92}
    })
}

fn bench_request_shaping(c: &mut Criterion) {
    let client = GeminiClient::new(&Settings::default()).unwrap();
    let mut group = c.benchmark_group("request_shaping");

    for prompt_len in [16, 1024, 16 * 1024] {
        group.bench_with_input(BenchmarkId::new("messages", prompt_len), &prompt_len, |b, &len| {
            b.iter(|| {
                let contents = create_message_request(len).into_contents().unwrap();
                let request = client.build_request(contents);
                black_box(serde_json::to_vec(&request).unwrap())
            })
        });
    }

    for turns in [1, 10, 50] {
        group.bench_with_input(BenchmarkId::new("contents", turns), &turns, |b, &turns| {
            b.iter(|| {
                let contents = create_contents_request(turns).into_contents().unwrap();
                black_box(serde_json::to_vec(&client.build_request(contents)).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_response_shaping(c: &mut Criterion) {
    let body = upstream_reply().to_string();

    c.bench_function("response_shaping", |b| {
        b.iter(|| {
            let parsed: GenerateContentResponse = serde_json::from_str(black_box(&body)).unwrap();
            let completion = ChatCompletion::from_text(parsed.first_text().unwrap_or_default());
            black_box(serde_json::to_vec(&completion).unwrap())
        })
    });
}

fn bench_record_encoding(c: &mut Criterion) {
    c.bench_function("progress_to_document", |b| {
        b.iter(|| {
            let request = SaveProgressRequest {
                user_id: Some("u1".to_string()),
                language: Some("ur".to_string()),
                quiz_data: Some(json!({"answers": [1, 2, 3, 4], "score": 3, "total": 4})),
            };
            let record = request.validate(chrono::Utc::now()).unwrap();
            black_box(bson::to_document(&record).unwrap())
        })
    });
}

criterion_group!(benches, bench_request_shaping, bench_response_shaping, bench_record_encoding);
criterion_main!(benches);
