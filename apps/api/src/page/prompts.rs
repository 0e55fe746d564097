// Prompt templates for the page compiler.
// Placeholders are `{name}` and are filled in a single pass, so text coming
// from the page document is never re-scanned for placeholders.

/// Whole-page prompt.
/// Fills: {layout_constraints}, {language}, {style}, {color_mode},
///        {aspect_ratio}, {writing_mode}, {instructions},
///        {character_designs}, {panel_details}
pub const PAGE_PROMPT_TEMPLATE: &str = "Generate a complete manga page following these specifications:

=== LAYOUT CONSTRAINTS ===
{layout_constraints}

=== STYLE SPECIFICATIONS ===
- Language: {language}
- Art style: {style}
- Color mode: {color_mode}
- Aspect ratio: {aspect_ratio}
- Writing mode: {writing_mode}

=== INSTRUCTIONS ===
{instructions}

=== CHARACTER DESIGNS ===
{character_designs}

=== PANEL DETAILS ===
{panel_details}

{generation_directives}";

/// Closing directives. Fixed text: the language and aspect ratio here do not
/// follow the page's own settings.
pub const GENERATION_DIRECTIVES: &str = "IMPORTANT:
- Use the attached character reference images to maintain consistent character designs
- Follow the layout constraints strictly
- Include speech bubbles with the specified dialogue in Japanese
- Maintain the aspect ratio of 1:1.4 (width:height)
- Generate the complete page as a single image with all panels";

/// Fills: {name}, {base_prompt}
pub const CHARACTER_DESIGN_TEMPLATE: &str = "Character: {name}\n{base_prompt}";

/// Fills: {number}, {page_position}, {background}, {description},
///        {characters}, {camera_angle}
pub const PANEL_TEMPLATE: &str = "Panel {number} (位置: {page_position}):
  Background: {background}
  Scene description: {description}
  Characters:
{characters}
  Camera angle: {camera_angle}";

/// Fills: {name}, {panel_position}, {emotion}, {facing}, {shot}, {pose},
///        {dialogue}
pub const PANEL_CHARACTER_TEMPLATE: &str = "  - Character: {name}
    Position: {panel_position}
    Emotion: {emotion}
    Facing: {facing}
    Shot type: {shot}
    Pose: {pose}
    Dialogue: \"{dialogue}\"";
