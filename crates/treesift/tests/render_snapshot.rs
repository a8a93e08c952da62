use insta::assert_snapshot;
use treesift::app::filter::TreeFilter;
use treesift::app::load::parse_document;
use treesift::app::render::{RenderOptions, render_mapping};

fn render(listing: &str) -> String {
    let document = parse_document(listing).expect("valid listing");
    let mapping = TreeFilter::default().apply(&document);
    render_mapping(&mapping, &RenderOptions::default()).expect("render mapping")
}

#[test]
fn component_listing_renders() {
    let rendered = render(
        r#"{"tree": [
            {"path": "components.json", "sha": "c0"},
            {"path": "src/components/ui/accordion.tsx", "sha": "a1"},
            {"path": "src/components/ui/button.tsx", "sha": "b2"},
            {"path": "src/components/site-header.tsx", "sha": "s3"},
            {"path": "src/lib/utils.ts", "sha": "u4"},
            {"path": "src/components/ui/dialog.tsx", "sha": "d5"},
            {"path": "src/lib/utils.ts", "sha": "u6"}
        ]}"#,
    );

    assert_snapshot!(rendered, @r#"
    {
      "src/components/ui/accordion.tsx": "a1",
      "src/components/ui/button.tsx": "b2",
      "src/lib/utils.ts": "u6",
      "src/components/ui/dialog.tsx": "d5"
    }
    "#);
}

#[test]
fn non_ascii_paths_render_escaped() {
    let rendered = render(r#"{"tree": [{"path": "src/components/ui/über.tsx", "sha": "e1"}]}"#);

    assert_snapshot!(rendered, @r#"
    {
      "src/components/ui/\u00fcber.tsx": "e1"
    }
    "#);
}
