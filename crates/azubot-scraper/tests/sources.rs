//! End-to-end scraper tests: each source runs against a `wiremock` server
//! serving trimmed-down copies of the real pages.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use azubot_core::{BoardKind, MembershipTier, Trend};
use azubot_scraper::{
    Bilibili, BilibiliUrls, EnrichOptions, Fetcher, GithubTrending, HttpRenderer, OriconRanking,
    ScraperError, VocaDb, YouTube,
};

fn test_fetcher() -> Fetcher {
    Fetcher::new(5, "azubot-test/0.1", 0, 0).expect("failed to build test Fetcher")
}

fn fast_enrich() -> EnrichOptions {
    EnrichOptions {
        concurrency: 5,
        pacing: Duration::ZERO,
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn bilibili_urls(server: &MockServer) -> BilibiliUrls {
    BilibiliUrls {
        space: server.uri(),
        api: server.uri(),
        video: server.uri(),
    }
}

// ---------------------------------------------------------------------------
// Oricon
// ---------------------------------------------------------------------------

const ORICON_PAGE: &str = r#"<html><body>
<div id="content-main"><div class="content-main-inner"><div class="content-rank-main"><div><article>
  <section><p>lead</p></section>
  <section>
    <div><h3>ignored</h3></div>
    <div>
      <h3>デイリー シングルランキング 2024年05月01日付</h3>
      <div><div>
        <dl><dt><a href="/prof/1/products/11/">jacket</a></dt><dd><h4>Song A</h4><p class="name">Artist A</p><p class="status new">NEW</p></dd></dl>
        <dl><dt><a href="/prof/2/products/22/">jacket</a></dt><dd><h4>Song B</h4><p class="name">Artist B</p><p class="status down">DOWN</p></dd></dl>
      </div></div>
    </div>
    <div></div>
    <div>
      <h3>週間 シングルランキング</h3>
      <div><div>
        <dl><dd><h4>Song C</h4><p class="name">Artist C</p><p class="status stay">STAY</p></dd></dl>
      </div></div>
    </div>
    <div></div>
    <div>
      <h3>デイリー アルバムランキング</h3>
      <div><div>
        <dl><dt><a href="/prof/3/products/33/">jacket</a></dt><dd><h4>Album D</h4><p class="name">Artist D</p><p class="status up">UP</p></dd></dl>
      </div></div>
    </div>
  </section>
</article></div></div></div></div>
</body></html>"#;

#[tokio::test]
async fn oricon_snapshot_has_four_boards_in_fixed_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rank/"))
        .respond_with(html(ORICON_PAGE))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let page_url = format!("{}/rank/", server.uri());
    let snapshot = OriconRanking::with_page_url(&fetcher, &page_url)
        .unwrap()
        .fetch_snapshot()
        .await
        .unwrap();

    let kinds: Vec<BoardKind> = snapshot.boards().iter().map(|b| b.kind).collect();
    assert_eq!(kinds, BoardKind::ALL.to_vec());

    let daily = snapshot.board(BoardKind::DailySingle);
    assert_eq!(daily.rule, "デイリー シングルランキング 2024年05月01日付");
    assert_eq!(daily.entries.len(), 2);
    assert_eq!(daily.entries[0].title, "Song A");
    assert_eq!(daily.entries[0].artist, "Artist A");
    assert_eq!(daily.entries[0].trend, Trend::New);
    assert_eq!(
        daily.entries[0].link.as_deref(),
        Some(format!("{}/prof/1/products/11/", server.uri()).as_str())
    );
    assert_eq!(daily.entries[1].trend, Trend::Down);

    let weekly = snapshot.board(BoardKind::WeeklySingle);
    assert_eq!(weekly.entries.len(), 1);
    assert!(weekly.entries[0].link.is_none());
    assert_eq!(weekly.entries[0].trend, Trend::Stay);

    assert_eq!(snapshot.board(BoardKind::DailyAlbum).entries[0].trend, Trend::Up);

    let weekly_album = snapshot.board(BoardKind::WeeklyAlbum);
    assert!(weekly_album.entries.is_empty());
    assert!(weekly_album.rule.is_empty());
    assert_eq!(snapshot.entry_count(), 4);
}

#[tokio::test]
async fn oricon_fetch_failure_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let page_url = format!("{}/rank/", server.uri());
    let err = OriconRanking::with_page_url(&fetcher, &page_url)
        .unwrap()
        .fetch_snapshot()
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::UnexpectedStatus { status: 500, .. }));
}

// ---------------------------------------------------------------------------
// GitHub trending
// ---------------------------------------------------------------------------

#[tokio::test]
async fn github_trending_rows_in_page_order() {
    let server = MockServer::start().await;
    let rows: String = (1..=8)
        .map(|i| {
            format!(
                r#"<article class="Box-row"><h2><a href="/owner{i}/ repo{i}">owner{i} / repo{i}</a></h2>
                   <p>Repo {i}</p><span itemprop="programmingLanguage">Rust</span>
                   <a href="/owner{i}/repo{i}/stargazers">{i},000</a></article>"#
            )
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/trending"))
        .respond_with(html(&format!("<html><body>{rows}</body></html>")))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let entries = GithubTrending::with_base_url(&fetcher, &server.uri())
        .fetch_trending()
        .await
        .unwrap();

    assert_eq!(entries.len(), 8);
    assert_eq!(entries[0].title, "owner1/repo1");
    assert_eq!(entries[0].link, format!("{}/owner1/repo1", server.uri()));
    assert_eq!(entries[0].stars, "1,000");
    assert_eq!(entries[7].description.as_deref(), Some("Repo 8"));
}

// ---------------------------------------------------------------------------
// VocaDB
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vocadb_list_and_pv_enrichment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs/top-rated"))
        .and(query_param("durationHours", "24"))
        .and(query_param("filterBy", "CreateDate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Song One", "artistString": "P feat. Miku"},
            {"id": 2, "name": "Song Two", "artistString": "Q feat. Rin"},
            {"id": 3, "name": "Song Three", "artistString": "R feat. Len"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/songs/1/with-rating"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "song": {"pvs": [
                {"service": "NicoNicoDouga", "url": "https://nico.test/sm1"},
                {"service": "Youtube", "url": "https://yt.test/watch?v=1"}
            ]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/songs/2/with-rating"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "song": {"pvs": [{"service": "Piapro", "url": "https://piapro.test/2"}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/songs/3/with-rating"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let vocadb = VocaDb::with_base_url(&fetcher, &server.uri());
    let mut entries = vocadb.top_rated().await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].artist, "P feat. Miku");

    let report = vocadb.attach_pv_links(&mut entries, fast_enrich()).await;
    assert_eq!(report.enriched, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(entries[0].pv_url.as_deref(), Some("https://yt.test/watch?v=1"));
    assert!(entries[1].pv_url.is_none());
    assert!(entries[2].pv_url.is_none());
}

// ---------------------------------------------------------------------------
// Bilibili
// ---------------------------------------------------------------------------

const SPACE_PAGE: &str = r#"<html><head>
<title>测试UP的个人空间-测试UP个人主页-哔哩哔哩视频</title>
<meta name="description" content="测试UP的个人空间，提供测试UP分享的视频、音频、文章内容，关注测试UP账号">
</head><body>
<script>window.__INITIAL_STATE__={"card":{"name":"state-name","face":"https://i0.test/face.jpg","level":6,"sign":"state sign"}}</script>
</body></html>"#;

const LISTING_PAGE: &str = r#"<html><body><script>window.__INITIAL_STATE__={"list":[
{"bvid":"BV1aa","title":"Video A","play":100,"created":1700000000,"length":"01:00","description":"a","pic":"//i0.test/a.jpg"},
{"bvid":"BV1bb","title":"Video B","play":200,"created":1700000100,"length":"02:00","description":"b","pic":"//i0.test/b.jpg"}
]}</script></body></html>"#;

const DETAIL_PAGE: &str = r#"<html><body><script>window.__INITIAL_STATE__={"videoData":{"title":"Video A (detail)","desc":"long","pic":"//i0.test/a2.jpg","duration":60,"pubdate":1700000000,"owner":{"mid":42,"name":"测试UP"},"stat":{"view":150,"reply":4,"favorite":9,"coin":3,"share":2,"like":30}}}</script></body></html>"#;

async fn mount_bilibili_profile(server: &MockServer, api_body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/42"))
        .respond_with(html(SPACE_PAGE))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x/space/wbi/acc/info"))
        .and(query_param("mid", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn bilibili_profile_merges_page_then_api() {
    let server = MockServer::start().await;
    mount_bilibili_profile(
        &server,
        json!({"code": 0, "message": "0", "data": {
            "mid": 42, "name": "api-name", "face": "https://i0.test/api.jpg", "sign": "api sign",
            "level": 0, "follower": 12345, "following": 67, "vip": {"type": 2}
        }}),
    )
    .await;

    let fetcher = test_fetcher();
    let profile = Bilibili::with_urls(&fetcher, bilibili_urls(&server))
        .fetch_profile("42")
        .await
        .unwrap();

    assert_eq!(profile.display_name, "测试UP");
    assert_eq!(profile.description, "测试UP分享的视频、音频、文章");
    assert_eq!(profile.avatar_url, "https://i0.test/face.jpg");
    assert_eq!(profile.level, 6, "api level 0 must not reset the page level");
    assert_eq!(profile.follower_count, 12_345);
    assert_eq!(profile.following_count, 67);
    assert_eq!(profile.membership, MembershipTier::Yearly);
    assert_eq!(profile.profile_url, format!("{}/42", server.uri()));
}

#[tokio::test]
async fn bilibili_api_error_code_does_not_abort_profile() {
    let server = MockServer::start().await;
    mount_bilibili_profile(&server, json!({"code": -352, "message": "风控校验失败"})).await;

    let fetcher = test_fetcher();
    let profile = Bilibili::with_urls(&fetcher, bilibili_urls(&server))
        .fetch_profile("42")
        .await
        .unwrap();
    assert_eq!(profile.display_name, "测试UP");
    assert_eq!(profile.follower_count, 0);
}

#[tokio::test]
async fn bilibili_profile_fails_when_every_pass_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let err = Bilibili::with_urls(&fetcher, bilibili_urls(&server))
        .fetch_profile("42")
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::UnexpectedStatus { status: 503, .. }));
}

#[tokio::test]
async fn bilibili_rendered_pass_fills_remaining_counters() {
    let server = MockServer::start().await;
    mount_bilibili_profile(
        &server,
        json!({"code": 0, "data": {"name": "api-name", "follower": 500, "following": 3}}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/render"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "html": "<html></html>",
            "title": "测试UP的个人空间",
            "result": {"username": "rendered", "follower": "9.9万", "following": "10",
                       "like": "3.4万", "play": "1.2亿", "level": 6, "vipType": 1,
                       "description": "", "face": ""}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let renderer = HttpRenderer::new(&format!("{}/render", server.uri()), 5).unwrap();
    let fetcher = test_fetcher().with_renderer(Arc::new(renderer));
    let profile = Bilibili::with_urls(&fetcher, bilibili_urls(&server))
        .render_wait(Duration::ZERO)
        .fetch_profile("42")
        .await
        .unwrap();

    assert_eq!(profile.follower_count, 500);
    assert_eq!(profile.like_count, 34_000);
    assert_eq!(profile.play_count, 120_000_000);
    assert_eq!(profile.membership, MembershipTier::Monthly);
}

#[tokio::test]
async fn bilibili_creator_report_enriches_and_tolerates_detail_failure() {
    let server = MockServer::start().await;
    mount_bilibili_profile(&server, json!({"code": 0, "data": {"follower": 10}})).await;
    Mock::given(method("GET"))
        .and(path("/42/video"))
        .respond_with(html(LISTING_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/video/BV1aa"))
        .respond_with(html(DETAIL_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/video/BV1bb"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let (report, enrich_report) = Bilibili::with_urls(&fetcher, bilibili_urls(&server))
        .creator_report("42", 10, fast_enrich())
        .await
        .unwrap();

    assert_eq!(report.items.len(), 2);
    assert_eq!(enrich_report.enriched, 1);
    assert_eq!(enrich_report.failed, 1);

    let a = &report.items[0];
    assert_eq!(a.id, "BV1aa");
    assert_eq!(a.title, "Video A");
    assert_eq!(a.view_count, 100);
    assert_eq!(a.like_count, 30);
    assert_eq!(a.coin_count, 3);
    assert_eq!(a.favorite_count, 9);
    assert_eq!(a.author, "测试UP");
    assert_eq!(a.cover_url, "https://i0.test/a.jpg");

    let b = &report.items[1];
    assert_eq!(b.id, "BV1bb");
    assert_eq!(b.view_count, 200);
    assert_eq!(b.like_count, 0);
}

#[tokio::test]
async fn bilibili_listing_failure_yields_profile_only() {
    let server = MockServer::start().await;
    mount_bilibili_profile(&server, json!({"code": 0, "data": {"follower": 10}})).await;
    Mock::given(method("GET"))
        .and(path("/42/video"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let (report, enrich_report) = Bilibili::with_urls(&fetcher, bilibili_urls(&server))
        .creator_report("42", 10, fast_enrich())
        .await
        .unwrap();
    assert!(report.items.is_empty());
    assert_eq!(enrich_report.attempted, 0);
    assert_eq!(report.profile.follower_count, 10);
}

// ---------------------------------------------------------------------------
// YouTube
// ---------------------------------------------------------------------------

const CHANNEL_PAGE: &str = r#"<html><head>
<meta name="description" content="Official channel.">
<meta property="og:title" content="Some Channel">
<meta property="og:image" content="https://yt3.test/avatar.jpg">
</head><body>
<script>var ytInitialData = {"header":{"subscriberCountText":{"simpleText":"1.2M subscribers"},"videosCountText":{"runs":[{"text":"321"},{"text":" videos"}]}}};</script>
</body></html>"#;

const UPLOADS_PAGE: &str = r#"<html><body><script>var ytInitialData = {"items":[
{"videoId":"vid1","title":{"runs":[{"text":"Upload One"}]},"shortViewCountText":{"simpleText":"15K views"},"publishedTimeText":{"simpleText":"1 day ago"}},
{"videoId":"vid2","title":{"runs":[{"text":"Upload Two"}]},"shortViewCountText":{"simpleText":"900 views"},"publishedTimeText":{"simpleText":"3 days ago"}}
]};</script></body></html>"#;

const WATCH_PAGE: &str = r#"<html><head>
<meta property="og:title" content="Upload One (watch)">
<meta property="og:description" content="Full description.">
</head><body>
<script>var ytInitialPlayerResponse = {"videoDetails":{"videoId":"vid1","lengthSeconds":"754","viewCount":"15321","ownerChannelName":"Some Channel"},"microformat":{"publishDate":"2024-05-01"}};</script>
<script>var ytInitialData = {"defaultText":{"accessibility":{"accessibilityData":{"label":"2,345 likes"}}}};</script>
</body></html>"#;

#[tokio::test]
async fn youtube_creator_report_by_handle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/@chan"))
        .respond_with(html(CHANNEL_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/@chan/videos"))
        .respond_with(html(UPLOADS_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "vid1"))
        .respond_with(html(WATCH_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "vid2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let (report, enrich_report) = YouTube::with_base_url(&fetcher, &server.uri())
        .creator_report("@chan", 10, fast_enrich())
        .await
        .unwrap();

    let profile = &report.profile;
    assert_eq!(profile.display_name, "Some Channel");
    assert_eq!(profile.description, "Official channel.");
    assert_eq!(profile.avatar_url, "https://yt3.test/avatar.jpg");
    assert_eq!(profile.follower_count, 1_200_000);
    assert_eq!(profile.content_count, 321);
    assert_eq!(profile.profile_url, format!("{}/@chan", server.uri()));

    assert_eq!(report.items.len(), 2);
    assert_eq!(enrich_report.enriched, 1);

    let first = &report.items[0];
    assert_eq!(first.title, "Upload One");
    assert_eq!(first.view_count, 15_000);
    assert_eq!(first.like_count, 2_345);
    assert_eq!(first.duration, "12:34");
    assert_eq!(first.description, "Full description.");
    assert_eq!(first.published_at, "1 day ago");
    assert_eq!(first.url, format!("{}/watch?v=vid1", server.uri()));
    assert_eq!(first.cover_url, "https://img.youtube.com/vi/vid1/maxresdefault.jpg");

    assert_eq!(report.items[1].like_count, 0);
}

#[tokio::test]
async fn youtube_watch_page_without_video_fields_is_not_enriched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "gone"))
        .respond_with(html("<html><head><title>YouTube</title></head><body></body></html>"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let err = YouTube::with_base_url(&fetcher, &server.uri())
        .fetch_video_detail("gone")
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Extraction { .. }), "got {err:?}");
}
