use std::sync::Arc;

use async_trait::async_trait;
use insta::assert_snapshot;
use quire::application::provision::{ProvisionOptions, provision, quizbin_fixture};
use quire::application::render::{
    ModeRegistry, PageRenderer, RegistryOptions, RenderError, RenderOptions,
};
use quire::application::repos::{
    CreatePageParams, LayoutsRepo, ModesRepo, PagesRepo, PagesWriteRepo, ReferenceDataRepo,
    RepoError,
};
use quire::domain::entities::{LayoutRecord, ModeRecord, PageRecord, TITLE_PLACEHOLDER};
use quire::infra::memory::InMemoryRepository;
use time::macros::datetime;

async fn seeded_repo() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    provision(&repo, &quizbin_fixture(), ProvisionOptions::default())
        .await
        .expect("provision quizbin");
    repo
}

fn renderer_with(repo: &InMemoryRepository, registry: ModeRegistry) -> PageRenderer {
    let repo = Arc::new(repo.clone());
    PageRenderer::new(repo.clone(), repo.clone(), repo, Arc::new(registry))
}

fn renderer(repo: &InMemoryRepository) -> PageRenderer {
    renderer_with(repo, ModeRegistry::builtin(RegistryOptions::default()))
}

async fn add_layout(repo: &InMemoryRepository, id: i32, header: &str, footer: &str) {
    repo.insert_layout_if_absent(&LayoutRecord {
        id,
        header: header.to_string(),
        footer: footer.to_string(),
    })
    .await
    .expect("insert layout");
}

async fn create_page(
    repo: &InMemoryRepository,
    id: &str,
    mode_id: i32,
    layout_id: i32,
    title: &str,
    content: &str,
) {
    repo.create_page(CreatePageParams {
        id: id.to_string(),
        mode_id,
        layout_id,
        title: title.to_string(),
        content: content.to_string(),
    })
    .await
    .expect("create page");
}

#[tokio::test]
async fn index_page_renders_through_the_quizbin_layout() {
    let repo = seeded_repo().await;
    let fixture = quizbin_fixture();
    let layout = &fixture.layouts[0];
    let index = fixture
        .pages
        .iter()
        .find(|page| page.id == "index")
        .expect("index page in fixture");

    let document = renderer(&repo).render("index").await.expect("render index");

    let expected = format!(
        "{}{}{}",
        layout.header.replace(TITLE_PLACEHOLDER, "QuizBin"),
        index.content,
        layout.footer
    );
    assert_eq!(document.body, expected);
    assert!(document.body.contains("<title>QuizBin</title>"));
    assert!(document.body.contains("<h1>QuizBin</h1>\n<p>Welcome to QuizBin blog</p>"));
    assert!(document.body.ends_with("</body></html>"));
    assert_eq!(document.last_modified, datetime!(2025-06-22 23:02:00 UTC));
}

#[tokio::test]
async fn missing_mode_is_a_broken_reference() {
    let repo = seeded_repo().await;
    repo.put_page_unchecked(PageRecord {
        id: "orphan".to_string(),
        created_at: datetime!(2025-06-22 23:02:00 UTC),
        updated_at: datetime!(2025-06-22 23:02:00 UTC),
        mode_id: 99,
        layout_id: 1,
        title: "Orphan".to_string(),
        content: "<p>never shown</p>".to_string(),
    });

    let err = renderer(&repo).render("orphan").await.unwrap_err();

    match &err {
        RenderError::BrokenModeReference { page_id, mode_id } => {
            assert_eq!(page_id, "orphan");
            assert_eq!(*mode_id, 99);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.status_code(), 500);
    assert!(err.is_integrity_fault());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn missing_layout_is_a_broken_reference() {
    let repo = seeded_repo().await;
    repo.put_page_unchecked(PageRecord {
        id: "unframed".to_string(),
        created_at: datetime!(2025-06-22 23:02:00 UTC),
        updated_at: datetime!(2025-06-22 23:02:00 UTC),
        mode_id: 2,
        layout_id: 42,
        title: "Unframed".to_string(),
        content: "<p>body</p>".to_string(),
    });

    let err = renderer(&repo).render("unframed").await.unwrap_err();
    assert!(matches!(
        err,
        RenderError::BrokenLayoutReference { layout_id: 42, .. }
    ));
}

#[tokio::test]
async fn unknown_page_is_not_found() {
    let repo = seeded_repo().await;
    let err = renderer(&repo).render("missing").await.unwrap_err();

    assert!(matches!(err, RenderError::PageNotFound { ref page_id } if page_id == "missing"));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn mode_without_transformer_is_unknown() {
    let repo = seeded_repo().await;
    repo.insert_mode_if_absent(&ModeRecord {
        id: 4,
        name: "asciidoc".to_string(),
    })
    .await
    .expect("insert mode");
    create_page(&repo, "adoc", 4, 1, "Adoc", "= Title").await;

    let err = renderer(&repo).render("adoc").await.unwrap_err();
    assert!(matches!(err, RenderError::UnknownMode { mode_id: 4, ref name } if name == "asciidoc"));
}

#[tokio::test]
async fn repeated_renders_are_identical() {
    let repo = seeded_repo().await;
    let renderer = renderer(&repo);

    let first = renderer.render("about").await.expect("first render");
    let second = renderer.render("about").await.expect("second render");

    assert_eq!(first, second);
}

#[tokio::test]
async fn placeholder_in_body_and_title_is_left_alone() {
    let repo = seeded_repo().await;
    add_layout(&repo, 7, "<title>%REPLACE_WITH_TITLE_ID%</title><main>", "</main>").await;
    create_page(
        &repo,
        "token",
        2,
        7,
        "Tricky %REPLACE_WITH_TITLE_ID%",
        "<p>literal %REPLACE_WITH_TITLE_ID% here</p>",
    )
    .await;

    let document = renderer(&repo).render("token").await.expect("render");

    assert_eq!(
        document.body,
        "<title>Tricky %REPLACE_WITH_TITLE_ID%</title><main>\
         <p>literal %REPLACE_WITH_TITLE_ID% here</p></main>"
    );
}

#[tokio::test]
async fn footer_is_not_substituted() {
    let repo = seeded_repo().await;
    add_layout(&repo, 8, "<div>", "<!-- %REPLACE_WITH_TITLE_ID% --></div>").await;
    create_page(&repo, "foot", 3, 8, "Title", "x").await;

    let document = renderer(&repo).render("foot").await.expect("render");
    assert!(document.body.ends_with("<!-- %REPLACE_WITH_TITLE_ID% --></div>"));
}

#[tokio::test]
async fn document_is_header_then_body_then_footer() {
    let repo = seeded_repo().await;
    add_layout(&repo, 9, "[head:%REPLACE_WITH_TITLE_ID%]", "[foot]").await;
    create_page(&repo, "plain", 3, 9, "T", "a < b && \"c\" > 'd'\n  indented").await;

    let document = renderer(&repo).render("plain").await.expect("render");

    assert_eq!(
        document.body,
        "[head:T]<pre class=\"plain-text\">a &lt; b &amp;&amp; &quot;c&quot; &gt; &#39;d&#39;\n  indented</pre>[foot]"
    );
}

#[tokio::test]
async fn markdown_page_renders_inside_layout() {
    let repo = seeded_repo().await;
    add_layout(
        &repo,
        10,
        "<html><head><title>%REPLACE_WITH_TITLE_ID%</title></head><body>",
        "</body></html>",
    )
    .await;
    create_page(&repo, "greeting", 1, 10, "Greeting", "# Hello\n\nSome *text*.").await;

    let document = renderer(&repo).render("greeting").await.expect("render");

    assert_snapshot!(document.body, @r"
<html><head><title>Greeting</title></head><body><h1>Hello</h1>
<p>Some <em>text</em>.</p>
</body></html>
");
}

#[tokio::test]
async fn markdown_byline_prefixes_body_when_enabled() {
    let repo = InMemoryRepository::with_clock(|| datetime!(2025-06-12 10:33:00 UTC));
    provision(&repo, &quizbin_fixture(), ProvisionOptions::default())
        .await
        .expect("provision");
    add_layout(&repo, 11, "<main>", "</main>").await;
    create_page(&repo, "post", 1, 11, "Post", "Body text").await;

    let plain = renderer(&repo).render("post").await.expect("render");
    assert_eq!(plain.body, "<main><p>Body text</p>\n</main>");

    let with_byline = renderer(&repo)
        .with_options(RenderOptions {
            markdown_byline: true,
        })
        .render("post")
        .await
        .expect("render with byline");
    assert_eq!(
        with_byline.body,
        "<main><h1>Post</h1><h4>Thu, June 12, 2025 at 10:33 AM UTC</h4><p>Body text</p>\n</main>"
    );
}

#[tokio::test]
async fn sanitizer_strips_scripts_when_enabled() {
    let repo = seeded_repo().await;
    add_layout(&repo, 12, "<main>", "</main>").await;
    create_page(
        &repo,
        "unsafe",
        2,
        12,
        "Unsafe",
        "<p onclick=\"steal()\">hi</p><script>alert(1)</script>",
    )
    .await;

    let trusting = renderer(&repo).render("unsafe").await.expect("render");
    assert!(trusting.body.contains("<script>"));

    let sanitizing = renderer_with(
        &repo,
        ModeRegistry::builtin(RegistryOptions {
            sanitize_html: true,
        }),
    )
    .render("unsafe")
    .await
    .expect("render sanitized");
    assert!(!sanitizing.body.contains("<script>"));
    assert!(!sanitizing.body.contains("onclick"));
    assert!(sanitizing.body.contains("<p>hi</p>"));
    assert!(sanitizing.body.starts_with("<main>"));
}

struct UnavailablePages;

#[async_trait]
impl PagesRepo for UnavailablePages {
    async fn find_page_by_id(&self, _id: &str) -> Result<Option<PageRecord>, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn list_page_ids(&self) -> Result<Vec<String>, RepoError> {
        Err(RepoError::Timeout)
    }
}

#[tokio::test]
async fn repository_failure_is_retryable() {
    let repo = Arc::new(seeded_repo().await);
    let modes: Arc<dyn ModesRepo> = repo.clone();
    let layouts: Arc<dyn LayoutsRepo> = repo;
    let renderer = PageRenderer::new(
        Arc::new(UnavailablePages),
        modes,
        layouts,
        Arc::new(ModeRegistry::builtin(RegistryOptions::default())),
    );

    let err = renderer.render("index").await.unwrap_err();
    assert!(matches!(err, RenderError::RepositoryUnavailable { .. }));
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), 503);
}
