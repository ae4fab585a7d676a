// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pr_stats::{BucketOptions, NormalizedPullRequest, parse_targets, summarize};

fn pull_requests(count: usize, contributors: usize,) -> Vec<NormalizedPullRequest,>
{
    (0..count)
        .map(|index| {
            let created_at = DateTime::<Utc,>::from_timestamp(1_700_000_000 - (index as i64) * 3_600, 0,)
                .expect("valid timestamp",);
            NormalizedPullRequest {
                username: format!("user{}", index % contributors),
                avatar_url: format!("https://avatars.example/{}", index % contributors),
                created_at,
                merged_at: (index % 3 != 0).then_some(created_at,),
                closed_at: (index % 5 != 0).then_some(created_at,),
            }
        },)
        .collect()
}

fn benchmark_summarize_small(c: &mut Criterion,)
{
    let prs = pull_requests(100, 10,);
    let options = BucketOptions::default();
    let now = Utc::now();

    c.bench_function("summarize_100_prs", |b| {
        b.iter(|| summarize("octocat", "hello-world", black_box(&prs,), &options, now,),)
    },);
}

fn benchmark_summarize_large(c: &mut Criterion,)
{
    let prs = pull_requests(20_000, 500,);
    let options = BucketOptions::default();
    let now = Utc::now();

    c.bench_function("summarize_20000_prs", |b| {
        b.iter(|| {
            let report = summarize("octocat", "hello-world", black_box(&prs,), &options, now,);
            black_box(report.to_pretty_json().expect("serializable",),)
        },)
    },);
}

fn benchmark_parse_targets(c: &mut Criterion,)
{
    let mut json = String::from("[",);
    for index in 0..200 {
        if index > 0 {
            json.push(',',);
        }
        json.push_str(&format!(r#"{{"owner":"owner{index}","repo":"repo{index}"}}"#),);
    }
    json.push(']',);

    c.bench_function("parse_200_targets", |b| {
        b.iter(|| parse_targets(black_box(&json,),).expect("parse failed",),)
    },);
}

criterion_group!(
    benches,
    benchmark_summarize_small,
    benchmark_summarize_large,
    benchmark_parse_targets
);
criterion_main!(benches);
