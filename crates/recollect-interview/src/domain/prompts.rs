//! Prompt and output-schema builders for the generation backend.
//!
//! Each text prompt carries one task heading from the constants below, so a
//! prompt can be recognised by what it asks for.

use serde_json::{Value, json};

use super::profile::{ContextParameters, RespondentProfile, SceneTopic};

/// Heading of the scene reconstruction prompt.
pub const SCENE_RECONSTRUCTION: &str = "SCENE RECONSTRUCTION";
/// Heading of the narrative revision prompt.
pub const NARRATIVE_REVISION: &str = "NARRATIVE REVISION";
/// Heading of the deep-question prompt.
pub const DEEP_QUESTIONS: &str = "DEEP QUESTIONS";
/// Heading of the context-parameter suggestion prompt.
pub const CONTEXT_PARAMETERS: &str = "CONTEXT PARAMETERS";

/// Edit instruction used after an answered question.
pub const ANSWER_EDIT_INSTRUCTION: &str = "Redraw the image naturally so it reflects the situation and emotional change described in the respondent's latest answer.";
/// Remix instruction used when the researcher leaves the field blank.
pub const DEFAULT_REMIX_INSTRUCTION: &str =
    "Adjust the image to the current context parameters (lighting, crowd density, camera distance).";

const VISUAL_STYLE: &str = "## Visual Style
- Style: Warm and soft-lit 3D cartoon rendering style
- Texture: Clay animation-like smooth texture with round, gentle forms
- Mood: Cute, friendly, realistic yet not exaggerated, natural atmosphere";

/// Fixed description of the respondent's character used in every
/// illustration.
#[must_use]
pub fn character_spec(profile: &RespondentProfile) -> String {
    format!(
        "- Main character: {name}\n- Gender: {gender}\n- Age group: {age}\n- Keep the same face, hairstyle and outfit in every scene",
        name = profile.name(),
        gender = profile.gender(),
        age = profile.age(),
    )
}

fn narrative_schema(description: &str, language: &str) -> Value {
    let labels = |what: &str| {
        json!({
            "type": "ARRAY",
            "items": { "type": "STRING" },
            "description": format!("{what} (3-5 items, in {language})"),
            "nullable": false,
        })
    };
    json!({
        "description": description,
        "type": "OBJECT",
        "properties": {
            "narrative": {
                "type": "STRING",
                "description": format!("First-person narrative of the scene in {language}"),
                "nullable": false,
            },
            "key_emotions": labels("Key emotions expressed in the scene"),
            "atmosphere": labels("Overall atmosphere or mood keywords of the scene"),
            "key_elements": labels("Important visual or contextual elements in the scene"),
        },
        "required": ["narrative", "key_emotions", "atmosphere", "key_elements"],
    })
}

/// Output schema shared by scene reconstruction and revision.
#[must_use]
pub fn scene_schema(language: &str) -> Value {
    narrative_schema("Narrative description of a contextual inquiry scene", language)
}

/// Prompt reconstructing a first-person scene from the 5W1H answers.
#[must_use]
pub fn scene_prompt(
    profile: &RespondentProfile,
    topic: &SceneTopic,
    planned_questions: &[String],
    language: &str,
) -> String {
    let mut prompt = format!(
        "# ROLE
You reconstruct a respondent's past experience as a short scene narrative for UX research, covering its temporal, spatial and emotional context.

# TASK: {SCENE_RECONSTRUCTION}
Using the input below, write a vivid first-person narrative that lets a reader see the moment as it happened. Structure it as orientation (when, where, who, what), action, evaluation (feelings and thoughts) and result.

# CHARACTER
- Name: {name}
- Gender: {gender}
- Age group: {age}

# INPUT DATA (5W1H)
{topic}
",
        name = profile.name(),
        gender = profile.gender(),
        age = profile.age(),
        topic = topic.prompt_lines(profile),
    );
    if !planned_questions.is_empty() {
        prompt.push_str("\n# INTERVIEW GUIDE\nThe researcher plans to ask:\n");
        for question in planned_questions {
            prompt.push_str("- ");
            prompt.push_str(question);
            prompt.push('\n');
        }
    }
    prompt.push_str(&format!(
        "
# OUTPUT DIRECTIVES
1. narrative: 5-8 natural sentences in {language}, first person, plain and concrete. Fill unstated details (lighting, sounds, number of people) only conservatively.
2. key_emotions: 3-5 emotions inferable from the input.
3. atmosphere: 3-5 mood keywords.
4. key_elements: 3-5 visual or contextual elements the respondent mentioned.
Ignore fields marked \"not specified\".

# TONE
Realistic and empathetic, never melodramatic."
    ));
    prompt
}

/// Prompt revising the narrative with an answered deep question.
#[must_use]
pub fn revision_prompt(narrative: &str, question: &str, answer: &str, language: &str) -> String {
    format!(
        "# ROLE
You maintain a user-experience scenario and update it as the respondent adds detail.

# TASK: {NARRATIVE_REVISION}
Update the current narrative so it reflects the psychological and situational context of the answer below, keeping the story coherent.

# CURRENT NARRATIVE
{narrative}

# QUESTION
{question}

# ANSWER
{answer}

# INTERPRETATION RULES
- Counterfactual or wishful statements (\"it would have been nice if...\", \"I wish...\") describe what the respondent wanted, not what happened. Never narrate them as actual events; express them as wishes or feelings.
- Keep every fact of the current narrative that the answer does not contradict.

# OUTPUT DIRECTIVES
1. narrative: 5-8 sentences in {language}, first person, keeping the original flow.
2. key_emotions: 3-5 emotions of the updated scene.
3. atmosphere: 3-5 mood keywords of the updated scene.
4. key_elements: 3-5 key elements of the updated scene."
    )
}

/// Prompt asking for three open follow-up questions, one per line.
#[must_use]
pub fn questions_prompt(narrative: &str, language: &str) -> String {
    format!(
        "# ROLE
You assist a qualitative researcher running an in-depth, photo-elicitation interview.

# TASK: {DEEP_QUESTIONS}
Read the respondent's narrative and write 3 follow-up questions that uncover pain points, emotional shifts and physical or psychological obstacles.

# NARRATIVE
\"{narrative}\"

# QUESTION GUIDELINES
1. Always ask open-ended questions; nothing answerable with yes or no, nothing judging the respondent.
2. Quote the respondent's own key expressions where it helps.
3. Balance context, action, emotion/thought and meaning/outcome; the first question covers whichever is least described so far.

# OUTPUT FORMAT
Only the 3 questions in {language}, one per line, without numbering or any other text."
    )
}

/// Output schema for context suggestions.
#[must_use]
pub fn context_schema() -> Value {
    let dial = |description: &str| {
        json!({ "type": "INTEGER", "description": description, "nullable": false })
    };
    json!({
        "description": "Contextual parameters for scene generation",
        "type": "OBJECT",
        "properties": {
            "light": dial("Lighting level: 0=dark, 1=normal, 2=bright"),
            "people": dial("Crowd density: 0=empty, 1=normal, 2=crowded"),
            "distance": dial("Camera distance: 0=close-up, 1=medium, 2=wide"),
        },
        "required": ["light", "people", "distance"],
    })
}

/// Prompt asking for context dials that fit the narrative.
#[must_use]
pub fn context_prompt(narrative: &str) -> String {
    format!(
        "# ROLE
You analyse scene narratives and recommend visual context settings.

# TASK: {CONTEXT_PARAMETERS}
Choose the best value for each of the three parameters for illustrating the narrative below.

# INPUT: NARRATIVE
{narrative}

# OUTPUT DIRECTIVES
Return JSON with values 0, 1 or 2:
1. light: 0=dark, 1=normal, 2=bright
2. people: 0=quiet, 1=normal, 2=crowded
3. distance: 0=close-up, 1=medium, 2=wide"
    )
}

/// Prompt for a fresh 16:9 scene illustration.
#[must_use]
pub fn illustration_prompt(
    profile: &RespondentProfile,
    narrative: &str,
    parameters: &ContextParameters,
) -> String {
    let narrative = if narrative.trim().is_empty() {
        "A person experiencing a moment in their daily life"
    } else {
        narrative
    };
    format!(
        "# ROLE
You are an expert 3D cartoon scene illustrator creating warm, friendly and emotionally expressive character scenes.

# TASK
Generate a 3D cartoon illustration that depicts the following experience in a visually engaging and emotionally authentic way.

# CONTEXT & STYLE
{VISUAL_STYLE}

## Character Specification
{character}

# INPUT: SCENE NARRATIVE
{narrative}

# OUTPUT DIRECTIVES
## Camera & Composition
Camera Angle: {camera}

## Environmental Context
{environment}

## Visual Requirements
1. Reflect the character's gender, age and appearance
2. Capture the emotional atmosphere of the narrative
3. Include the environmental elements that support the story

# TONE
Warm, relatable and empathetic. Avoid dramatic or exaggerated expressions.",
        character = character_spec(profile),
        camera = parameters.camera_angle(),
        environment = parameters.summary(),
    )
}

/// Prompt for editing the current illustration in place.
#[must_use]
pub fn edit_prompt(
    profile: &RespondentProfile,
    narrative: &str,
    instruction: &str,
    parameters: &ContextParameters,
) -> String {
    format!(
        "# ROLE
You are an expert 3D cartoon scene illustrator who modifies existing scenes based on feedback.

# TASK
Modify the provided image according to the request while keeping its overall style and composition.

# CONTEXT & STYLE
{VISUAL_STYLE}

## Character Specification
{character}

# CURRENT SCENE DESCRIPTION
{narrative}

# MODIFICATION REQUEST
{instruction}

# OUTPUT DIRECTIVES
Camera Angle: {camera}
- Keep the original camera angle and composition unless the request says otherwise

## Environmental Context
{environment}

## Modification Guidelines
1. Keep the character's appearance and position consistent with the original
2. Apply the requested changes naturally and seamlessly
3. Preserve the emotional tone of the narrative

# TONE
The result should feel like a natural evolution of the original scene.",
        character = character_spec(profile),
        camera = parameters.camera_angle(),
        environment = parameters.summary(),
    )
}

/// Prompt for a 2:1 equirectangular panorama of the scene's surroundings.
/// `revision` describes a visual change the panorama should also reflect.
#[must_use]
pub fn panorama_prompt(location: &str, narrative: &str, revision: Option<&str>) -> String {
    let mut prompt = format!(
        "# ROLE
You are an expert photographer specialising in 360-degree equirectangular panoramas.

# TASK
Generate a photorealistic 360-degree equirectangular panorama of the environment below.

# SCENE CONTEXT
Location: {location}
Situation: {narrative}

# FORMAT REQUIREMENTS
1. Equirectangular projection, exactly 2:1, full 360x180 degree coverage
2. Horizon at the vertical centre, eye level around 1.6m
3. Left and right edges must join seamlessly: matching geometry, lighting and colour

# CONTENT REQUIREMENTS
- No people or characters; environment, architecture and objects only
- Natural lighting matching the situation, realistic textures and depth"
    );
    if let Some(revision) = revision.map(str::trim).filter(|r| !r.is_empty()) {
        prompt.push_str("\n\n# MODIFICATION\n");
        prompt.push_str(revision);
    }
    prompt
}
