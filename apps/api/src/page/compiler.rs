//! Prompt compiler — flattens a `PageSpec` into one natural-language prompt.
//!
//! Pure and deterministic: no I/O, no clock, no randomness. Panels are
//! rendered in sequence order; `Panel::number` is printed but never used to
//! reorder. Only the first dialogue line of each panel character is rendered,
//! and `effects` / `monologues` are not rendered at all.

use crate::models::page::{CharacterIdentity, PageSpec, Panel, PanelCharacter};
use crate::page::prompts::{
    CHARACTER_DESIGN_TEMPLATE, GENERATION_DIRECTIVES, PAGE_PROMPT_TEMPLATE,
    PANEL_CHARACTER_TEMPLATE, PANEL_TEMPLATE,
};

/// Compiles a page into the prompt sent alongside the reference images.
pub fn compile(page: &PageSpec) -> String {
    let character_designs = page
        .characters
        .iter()
        .map(render_character_design)
        .collect::<Vec<_>>()
        .join("\n\n");

    let panel_details = page
        .panels
        .iter()
        .map(render_panel)
        .collect::<Vec<_>>()
        .join("\n\n");

    fill_template(
        PAGE_PROMPT_TEMPLATE,
        &[
            ("layout_constraints", page.layout_constraints()),
            ("language", page.language()),
            ("style", page.style()),
            ("color_mode", page.color_mode()),
            ("aspect_ratio", page.aspect_ratio()),
            ("writing_mode", page.writing_mode()),
            ("instructions", page.instructions()),
            ("character_designs", &character_designs),
            ("panel_details", &panel_details),
            ("generation_directives", GENERATION_DIRECTIVES),
        ],
    )
}

fn render_character_design(character: &CharacterIdentity) -> String {
    fill_template(
        CHARACTER_DESIGN_TEMPLATE,
        &[
            ("name", &character.name),
            ("base_prompt", character.base_prompt()),
        ],
    )
}

fn render_panel(panel: &Panel) -> String {
    let characters = panel
        .characters
        .iter()
        .map(render_panel_character)
        .collect::<Vec<_>>()
        .join("\n");
    let number = panel.number.to_string();

    fill_template(
        PANEL_TEMPLATE,
        &[
            ("number", &number),
            ("page_position", panel.page_position()),
            ("background", panel.background()),
            ("description", panel.description()),
            ("characters", &characters),
            ("camera_angle", panel.camera_angle()),
        ],
    )
}

fn render_panel_character(character: &PanelCharacter) -> String {
    fill_template(
        PANEL_CHARACTER_TEMPLATE,
        &[
            ("name", &character.name),
            ("panel_position", character.panel_position()),
            ("emotion", character.emotion()),
            ("facing", character.facing()),
            ("shot", character.shot()),
            ("pose", character.pose()),
            ("dialogue", character.first_line()),
        ],
    )
}

/// Single-pass `{key}` substitution. Unknown keys and stray braces are
/// copied through unchanged; substituted values are not re-scanned.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replacement = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::page::DialogueLine;
    use crate::page::example::EXAMPLE_PAGE_YAML;
    use crate::page::markup::parse_page;

    fn panel(number: i64) -> Panel {
        Panel {
            number,
            ..Default::default()
        }
    }

    fn page_with_panels(panels: Vec<Panel>) -> PageSpec {
        PageSpec {
            panels,
            ..Default::default()
        }
    }

    #[test]
    fn test_fill_template_single_pass() {
        let out = fill_template("a {x} b {y}", &[("x", "{y}"), ("y", "Y")]);
        assert_eq!(out, "a {y} b Y");
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_stray_braces() {
        let out = fill_template("{unknown} { open", &[("x", "1")]);
        assert_eq!(out, "{unknown} { open");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let page = parse_page(EXAMPLE_PAGE_YAML).unwrap();
        assert_eq!(compile(&page), compile(&page));
    }

    #[test]
    fn test_panels_keep_sequence_order_not_number_order() {
        let page = page_with_panels(vec![panel(2), panel(1), panel(3)]);
        let prompt = compile(&page);

        let p2 = prompt.find("Panel 2 (").unwrap();
        let p1 = prompt.find("Panel 1 (").unwrap();
        let p3 = prompt.find("Panel 3 (").unwrap();
        assert!(p2 < p1);
        assert!(p1 < p3);
    }

    #[test]
    fn test_character_without_lines_renders_empty_dialogue() {
        let mut p = panel(1);
        p.characters.push(PanelCharacter {
            name: "TEN".to_string(),
            ..Default::default()
        });
        let prompt = compile(&page_with_panels(vec![p]));
        assert!(prompt.contains("  - Character: TEN\n    Position: center\n"));
        assert!(prompt.contains("    Dialogue: \"\""));
    }

    #[test]
    fn test_only_first_dialogue_line_is_rendered() {
        let mut p = panel(1);
        p.characters.push(PanelCharacter {
            name: "TEN".to_string(),
            lines: vec![
                DialogueLine {
                    text: "first".to_string(),
                    ..Default::default()
                },
                DialogueLine {
                    text: "second".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let prompt = compile(&page_with_panels(vec![p]));
        assert!(prompt.contains("Dialogue: \"first\""));
        assert!(!prompt.contains("second"));
    }

    #[test]
    fn test_panel_without_characters_renders_empty_block() {
        let prompt = compile(&page_with_panels(vec![panel(7)]));
        let expected = "Panel 7 (位置: middle):\n  Background: \n  Scene description: \n  Characters:\n\n  Camera angle: medium shot";
        assert!(prompt.contains(expected), "prompt was:\n{prompt}");
    }

    #[test]
    fn test_empty_character_set_yields_empty_designs_block() {
        let prompt = compile(&page_with_panels(vec![panel(1)]));
        assert!(prompt.contains("=== CHARACTER DESIGNS ===\n\n\n=== PANEL DETAILS ==="));
    }

    #[test]
    fn test_style_block_defaults() {
        let prompt = compile(&page_with_panels(vec![panel(1)]));
        let expected = "=== STYLE SPECIFICATIONS ===
- Language: Japanese
- Art style: japanese manga
- Color mode: カラー
- Aspect ratio: 1:1.4
- Writing mode: vertical-rl
";
        assert!(prompt.contains(expected));
        assert!(prompt.contains("dialogue in Japanese"));
        assert!(prompt.contains("aspect ratio of 1:1.4 (width:height)"));
    }

    #[test]
    fn test_directives_are_fixed_text() {
        let mut page = page_with_panels(vec![panel(1)]);
        page.language = Some("English".to_string());
        page.aspect_ratio = Some("4:5".to_string());
        let prompt = compile(&page);
        assert!(prompt.contains("- Language: English"));
        assert!(prompt.contains("- Aspect ratio: 4:5"));
        assert!(prompt.ends_with(GENERATION_DIRECTIVES));
        assert!(prompt.contains("dialogue in Japanese"));
        assert!(prompt.contains("aspect ratio of 1:1.4 (width:height)"));
        assert!(!prompt.contains("dialogue in English"));
    }

    #[test]
    fn test_page_text_is_not_treated_as_placeholder() {
        let mut page = page_with_panels(vec![panel(1)]);
        page.instructions = Some("keep {style} literal".to_string());
        let prompt = compile(&page);
        assert!(prompt.contains("keep {style} literal"));
    }

    #[test]
    fn test_example_page_scenario() {
        let page = parse_page(EXAMPLE_PAGE_YAML).unwrap();
        let prompt = compile(&page);

        let layout = prompt
            .find("指示: 以下のレイアウト制約を厳守して画像を生成してください。")
            .unwrap();
        let ten = prompt
            .find("A young male engineer character in chibi/deformed anime style.")
            .unwrap();
        let robot = prompt
            .find("A cute robot character in chibi/deformed anime style wearing an astronaut suit.")
            .unwrap();
        let panel1 = prompt.find("Panel 1 (位置: top):").unwrap();
        let panel2 = prompt.find("Panel 2 (位置: middle):").unwrap();
        let panel3 = prompt.find("Panel 3 (位置: bottom):").unwrap();

        assert!(layout < ten);
        assert!(ten < robot);
        assert!(robot < panel1);
        assert!(panel1 < panel2);
        assert!(panel2 < panel3);

        let line1 = prompt
            .find("Dialogue: \"インスタでマンガ投稿したいけど...毎回描くの無理ゲーすぎる\"")
            .unwrap();
        let line2 = prompt
            .find("Dialogue: \"それ、AIで自動化できますよ！Google の Nano Banana 知ってます？\"")
            .unwrap();
        let line3 = prompt.find("Dialogue: \"マジで!? どうやるの？\"").unwrap();
        assert!(panel1 < line1 && line1 < panel2);
        assert!(panel2 < line2 && line2 < panel3);
        assert!(panel3 < line3);
    }
}
