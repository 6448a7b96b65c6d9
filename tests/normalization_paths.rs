//! The tree and lightweight normalization paths must agree on what reaches
//! the Markdown output.

use clipmark::{
    ConversionOptions, ConversionResult, NormalizationMode, convert_html_to_markdown_sync,
    normalize_structure,
};

const DOCUMENT: &str = r#"<div class="doc">
<h2 class="title">Quarterly report</h2>
<p>Revenue is <b>up</b> and costs are <i>down</i>. See <a href="https://e.com/report" class="x">the report</a>.</p>
<table class="grid">
<tr><th>Region</th><th>Q1</th><th>Q2</th></tr>
<tr><td>North</td><td>10</td><td>12</td></tr>
<tr><td>South</td><td>8</td><td>9</td></tr>
</table>
<p>Closing note.</p>
</div>"#;

fn convert(mode: NormalizationMode) -> ConversionResult<String> {
    convert_html_to_markdown_sync(DOCUMENT, &ConversionOptions::default().with_normalization(mode))
}

fn collapse(markdown: &str) -> String {
    markdown.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn table_lines(markdown: &str) -> Vec<&str> {
    markdown.lines().filter(|line| line.starts_with('|')).collect()
}

#[test]
fn test_paths_render_the_same_table() -> ConversionResult<()> {
    let tree = convert(NormalizationMode::Tree)?;
    let light = convert(NormalizationMode::Lightweight)?;
    assert_eq!(table_lines(&tree), table_lines(&light));
    assert_eq!(
        table_lines(&tree),
        vec![
            "| Region | Q1 | Q2 |",
            "| --- | --- | --- |",
            "| North | 10 | 12 |",
            "| South | 8 | 9 |",
        ]
    );
    Ok(())
}

#[test]
fn test_paths_keep_the_same_content() -> ConversionResult<()> {
    for mode in [NormalizationMode::Tree, NormalizationMode::Lightweight] {
        let md = convert(mode)?;
        let flat = collapse(&md);
        assert!(flat.contains("## Quarterly report"), "{mode:?}: {md}");
        assert!(flat.contains("**up**"), "{mode:?}: {md}");
        assert!(flat.contains("_down_"), "{mode:?}: {md}");
        assert!(flat.contains("[the report](https://e.com/report)"), "{mode:?}: {md}");
        assert!(flat.ends_with("Closing note."), "{mode:?}: {md}");
        assert!(!md.contains("class"), "{mode:?}: {md}");
    }
    Ok(())
}

#[test]
fn test_layout_table_unwraps_on_both_paths() -> ConversionResult<()> {
    let html = "<table><tr><td><h1>Title</h1><p>Intro text</p></td></tr></table>";
    for mode in [NormalizationMode::Tree, NormalizationMode::Lightweight] {
        let md = convert_html_to_markdown_sync(
            html,
            &ConversionOptions::default().with_normalization(mode),
        )?;
        assert_eq!(md, "# Title\n\nIntro text", "{mode:?}");
    }
    Ok(())
}

#[test]
fn test_auto_mode_switches_for_large_documents() -> ConversionResult<()> {
    let row = "<tr><td>alpha</td><td>beta</td><td>gamma</td></tr>";
    let html = format!("<p>Intro</p><table>{}</table>", row.repeat(40));

    let small = ConversionOptions::default().with_large_document_threshold(usize::MAX);
    let large = ConversionOptions::default().with_large_document_threshold(16);
    assert!(!small.use_lightweight_path(html.len()));
    assert!(large.use_lightweight_path(html.len()));

    let tree = convert_html_to_markdown_sync(&html, &small)?;
    let light = convert_html_to_markdown_sync(&html, &large)?;
    assert_eq!(collapse(&tree), collapse(&light));
    assert_eq!(table_lines(&tree).len(), 41);
    Ok(())
}

#[test]
fn test_structure_normalization_is_idempotent() -> ConversionResult<()> {
    let options = ConversionOptions::default();
    for input in [
        DOCUMENT,
        "<div><div><span><span>deep</span></span></div></div>",
        r#"<table><tr><td rowspan="2">a</td><td>b</td></tr><tr><td>c</td></tr></table>"#,
        "<p><b style=\"font-weight:normal\">plain</b> <span style=\"font-style:italic\">it</span></p>",
    ] {
        let once = normalize_structure(input, &options)?;
        let twice = normalize_structure(&once, &options)?;
        assert_eq!(once, twice, "not idempotent for {input}");
    }
    Ok(())
}

#[test]
fn test_rowspan_fills_every_row() -> ConversionResult<()> {
    let md = convert_html_to_markdown_sync(
        r#"<table><tr><th>Team</th><th>Name</th><th>Role</th></tr>
           <tr><td rowspan="2">Core</td><td>Ana</td><td>Lead</td></tr>
           <tr><td>Bo</td><td>Dev</td></tr></table>"#,
        &ConversionOptions::default(),
    )?;
    assert!(md.contains("| Core | Ana | Lead |"), "{md}");
    assert!(md.contains("| Core | Bo | Dev |"), "{md}");
    Ok(())
}

#[test]
fn test_unquoted_link_target_kept_on_both_paths() -> ConversionResult<()> {
    for mode in [NormalizationMode::Tree, NormalizationMode::Lightweight] {
        let md = convert_html_to_markdown_sync(
            "<p><a href=https://e.com>go</a></p>",
            &ConversionOptions::default().with_normalization(mode),
        )?;
        assert_eq!(md, "[go](https://e.com)", "{mode:?}");
    }
    Ok(())
}

