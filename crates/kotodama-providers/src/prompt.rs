//! Prompt builder: turns a request, a brand voice, and an optional target
//! profile into a system prompt and a user prompt.
//!
//! Pure and deterministic: no clock, no randomness, no I/O. Missing optional
//! fields are left out of the prompt.

use std::fmt::Write;

use kotodama_core::types::{
    BrandVoice, GenerateRequest, ReplyContext, ToneAttributes, UserProfile, MAX_POST_CHARS,
};

/// Maximum number of a target's common phrases quoted in the prompt.
pub const MAX_COMMON_PHRASES: usize = 10;

/// Which optional sections a provider's prompt carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromptStyle {
    /// Vocabulary, do's, don'ts, and platform rules.
    pub extended_sections: bool,
    /// Describe each tone dial's endpoints next to its value.
    pub annotated_tone: bool,
}

impl PromptStyle {
    /// Every section, annotated tone.
    pub const FULL: PromptStyle = PromptStyle {
        extended_sections: true,
        annotated_tone: true,
    };
    /// Extended sections, bare tone values.
    pub const EXTENDED: PromptStyle = PromptStyle {
        extended_sections: true,
        annotated_tone: false,
    };
    /// Core sections only.
    pub const BASIC: PromptStyle = PromptStyle {
        extended_sections: false,
        annotated_tone: false,
    };
}

/// A system prompt and a user prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}

impl Prompts {
    /// Both prompts in one string, for vendors without a system role.
    pub fn combined(&self) -> String {
        format!("{}\n\nUser Request:\n{}", self.system, self.user)
    }
}

/// Build the system and user prompts for one generation call.
pub fn build_prompts(
    request: &GenerateRequest,
    voice: &BrandVoice,
    target: Option<&UserProfile>,
    style: PromptStyle,
) -> Prompts {
    Prompts {
        system: build_system_prompt(request, voice, target, style),
        user: build_user_prompt(request),
    }
}

// ────────────── System prompt ──────────────

fn build_system_prompt(
    request: &GenerateRequest,
    voice: &BrandVoice,
    target: Option<&UserProfile>,
    style: PromptStyle,
) -> String {
    let mut p = String::from(
        "You are a tweet composition assistant. Your task is to write tweets that match the following brand voice:\n\n",
    );

    if let Some(description) = non_blank(voice.description.as_deref()) {
        let _ = write!(p, "Brand Voice Description: {description}\n\n");
    }

    if let Some(guidelines) = non_blank(voice.guidelines.as_deref()) {
        let _ = write!(p, "Guidelines: {guidelines}\n\n");
    }

    if !voice.example_tweets.is_empty() {
        p.push_str("Example tweets from this brand voice:\n");
        for (i, tweet) in voice.example_tweets.iter().enumerate() {
            let _ = writeln!(p, "{}. {}", i + 1, tweet);
        }
        p.push('\n');
    }

    if style.extended_sections {
        push_extended_sections(&mut p, voice);
    }

    let tone = match &request.tone_adjustment {
        Some(delta) => voice.tone_attributes.adjusted(delta),
        None => voice.tone_attributes,
    };
    push_tone(&mut p, &tone, style.annotated_tone);

    if let Some(profile) = target {
        let attrs = &profile.style_attributes;
        p.push_str("Additionally, adapt your response to match the communication style of the person you're replying to:\n");
        let _ = writeln!(p, "Username: @{}", profile.username);
        let _ = writeln!(p, "Their typical tweet length: {} characters", attrs.avg_length);
        if !attrs.common_phrases.is_empty() {
            let phrases: Vec<&str> = attrs
                .common_phrases
                .iter()
                .take(MAX_COMMON_PHRASES)
                .map(String::as_str)
                .collect();
            let _ = writeln!(p, "Common phrases they use: {}", phrases.join(", "));
        }
        p.push('\n');
    }

    p.push_str("Important rules:\n");
    let _ = writeln!(p, "- Keep tweets under {MAX_POST_CHARS} characters");
    p.push_str("- Be authentic and natural\n");
    p.push_str("- Match the brand voice while being engaging\n");
    p.push_str("- Do not use hashtags unless specifically requested\n");
    p.push_str("- Write in a conversational tone\n");

    if target.is_some() || request.reply_context.is_some() {
        p.push_str(
            "- Acknowledge and respond to the specific points in the tweet you're replying to\n",
        );
    }

    p
}

fn push_extended_sections(p: &mut String, voice: &BrandVoice) {
    if let Some(vocab) = &voice.vocabulary {
        if !vocab.approved.is_empty() {
            let _ = write!(
                p,
                "Vocabulary - Approved Terms (Use these):\n{}\n\n",
                vocab.approved.join(", ")
            );
        }
        if !vocab.avoid.is_empty() {
            let _ = write!(
                p,
                "Vocabulary - Avoid these Terms:\n{}\n\n",
                vocab.avoid.join(", ")
            );
        }
    }

    if !voice.dos_list.is_empty() {
        let _ = write!(p, "Do's:\n{}\n\n", bullet_list(&voice.dos_list));
    }

    if !voice.donts_list.is_empty() {
        let _ = write!(p, "Don'ts:\n{}\n\n", bullet_list(&voice.donts_list));
    }

    if let Some(rules) = voice.twitter_rules() {
        p.push_str("Platform Rules (Twitter):\n");
        let _ = writeln!(p, "- Style: {}", rules.style);
        let _ = writeln!(p, "- Format: {}", rules.format);
        let _ = writeln!(p, "- Emoji Usage: {}", rules.emoji_usage);
        let _ = write!(p, "- Length target: {}\n\n", rules.length);
    }
}

fn push_tone(p: &mut String, tone: &ToneAttributes, annotated: bool) {
    let dials: [(&str, u8, &str); 6] = [
        ("Formality", tone.formality, "0=very casual, 100=very professional"),
        ("Humor", tone.humor, "0=serious, 100=humorous"),
        ("Technicality", tone.technicality, "0=simple language, 100=technical jargon"),
        ("Empathy", tone.empathy, "0=direct, 100=empathetic"),
        ("Energy", tone.energy, "0=calm, 100=energetic"),
        ("Authenticity", tone.authenticity, "0=reserved, 100=vulnerable/personal"),
    ];

    if annotated {
        p.push_str("Tone Attributes (adjust your writing style to match these values):\n");
    } else {
        p.push_str("Tone Attributes:\n");
    }
    for (name, value, scale) in dials {
        if annotated {
            let _ = writeln!(p, "- {name}: {value}/100 ({scale})");
        } else {
            let _ = writeln!(p, "- {name}: {value}/100");
        }
    }
    p.push('\n');
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

// ────────────── User prompt ──────────────

fn build_user_prompt(request: &GenerateRequest) -> String {
    let length = request.effective_thread_length();

    match &request.reply_context {
        Some(ctx) => {
            let mut p = reply_context_block(ctx);
            p.push_str("\n[YOUR TASK]\n");
            let _ = writeln!(
                p,
                "Write a reply to the above tweet based on this instruction:\n\"{}\"",
                request.prompt
            );
            if request.is_thread {
                let _ = write!(
                    p,
                    "\n\nFormat as a thread of {length} tweets. Return each tweet on a new line, numbered 1-{length}."
                );
            }
            p
        }
        None if request.is_thread => format!(
            "Create a Twitter thread with {length} tweets based on this topic:\n\n{}\n\nReturn each tweet on a new line, numbered 1-{length}.",
            request.prompt
        ),
        None => request.prompt.clone(),
    }
}

fn reply_context_block(ctx: &ReplyContext) -> String {
    let mut p = String::from("[CONTEXT - THE TWEET WE ARE REPLYING TO]\n");
    match non_blank(ctx.display_name.as_deref()) {
        Some(name) => {
            let _ = writeln!(p, "Author: @{} ({})", ctx.username, name);
        }
        None => {
            let _ = writeln!(p, "Author: @{}", ctx.username);
        }
    }
    if let Some(ts) = non_blank(ctx.timestamp.as_deref()) {
        let _ = writeln!(p, "Time: {ts}");
    }
    let _ = writeln!(p, "Content: \"{}\"", ctx.text);

    if !ctx.images.is_empty() {
        let _ = writeln!(
            p,
            "Visual Context (Image Alt Text): {}",
            ctx.images.join("; ")
        );
    }

    if let Some(m) = &ctx.metrics {
        let mut parts = Vec::new();
        if m.replies > 0 {
            parts.push(format!("{} replies", m.replies));
        }
        if m.retweets > 0 {
            parts.push(format!("{} retweets", m.retweets));
        }
        if m.likes > 0 {
            parts.push(format!("{} likes", m.likes));
        }
        if !parts.is_empty() {
            let _ = writeln!(p, "Metrics: {}", parts.join(", "));
        }
    }
    p
}

// ────────────── Style analysis ──────────────

/// Instruction for the style analysis call.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are analyzing Twitter profiles. Analyze the writing style, tone, and patterns from the provided tweets. Return ONLY a valid JSON object with the following structure:
{
  \"avgLength\": <number>,
  \"commonPhrases\": [<array of strings>],
  \"tone\": {
    \"formality\": <number 0-100>,
    \"humor\": <number 0-100>,
    \"technicality\": <number 0-100>
  }
}";

/// Prompts for a style analysis over `samples`.
pub fn build_analysis_prompts(samples: &[String]) -> Prompts {
    let listed: Vec<String> = samples
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t))
        .collect();
    Prompts {
        system: ANALYSIS_SYSTEM_PROMPT.to_string(),
        user: format!("Analyze these tweets:\n\n{}", listed.join("\n")),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kotodama_core::types::{
        EngagementMetrics, PlatformGuidelines, PlatformRules, StyleAttributes, ToneAdjustment,
        Vocabulary,
    };

    fn rich_voice() -> BrandVoice {
        let mut voice = BrandVoice::new("v1", "Builder");
        voice.description = Some("Practical indie hacker".into());
        voice.guidelines = Some("Show, don't tell".into());
        voice.example_tweets = vec!["Shipped it.".into(), "Fixed the bug at 2am.".into()];
        voice.vocabulary = Some(Vocabulary {
            approved: vec!["ship".into(), "iterate".into()],
            avoid: vec!["synergy".into()],
        });
        voice.dos_list = vec!["Share numbers".into()];
        voice.donts_list = vec!["Humblebrag".into()];
        voice.platform_guidelines = Some(PlatformGuidelines {
            twitter: Some(PlatformRules {
                style: "punchy".into(),
                format: "one idea per tweet".into(),
                emoji_usage: "sparingly".into(),
                length: "under 200".into(),
            }),
        });
        voice
    }

    fn target(phrases: usize) -> UserProfile {
        UserProfile {
            id: "profile_jane".into(),
            username: "jane".into(),
            analyzed_tweets: Vec::new(),
            style_attributes: StyleAttributes {
                avg_length: 120.0,
                common_phrases: (0..phrases).map(|i| format!("phrase{i}")).collect(),
                tone_profile: ToneAttributes::default(),
            },
            last_analyzed: Utc::now(),
        }
    }

    #[test]
    fn test_default_voice_single_post() {
        let req = GenerateRequest::new("announce a product launch", "default");
        let prompts = build_prompts(&req, &BrandVoice::default_voice(), None, PromptStyle::FULL);

        assert!(prompts.system.contains("Formality: 50/100"));
        assert!(prompts.system.contains("Authenticity: 50/100"));
        assert!(!prompts.system.contains("Example tweets"));
        assert!(!prompts.system.contains("Brand Voice Description"));
        assert!(prompts.system.contains("- Keep tweets under 280 characters\n"));
        assert!(!prompts.system.contains("Acknowledge and respond"));
        assert_eq!(prompts.user, "announce a product launch");
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let req = GenerateRequest::new("topic", "v1").thread(4);
        let voice = rich_voice();
        let profile = target(3);
        let a = build_prompts(&req, &voice, Some(&profile), PromptStyle::FULL);
        let b = build_prompts(&req, &voice, Some(&profile), PromptStyle::FULL);
        assert_eq!(a, b);
    }

    #[test]
    fn test_section_order() {
        let req = GenerateRequest::new("topic", "v1");
        let profile = target(1);
        let system = build_prompts(&req, &rich_voice(), Some(&profile), PromptStyle::FULL).system;

        let order = [
            "You are a tweet composition assistant",
            "Brand Voice Description: Practical indie hacker",
            "Guidelines: Show, don't tell",
            "Example tweets from this brand voice:\n1. Shipped it.\n2. Fixed the bug at 2am.",
            "Vocabulary - Approved Terms (Use these):\nship, iterate",
            "Vocabulary - Avoid these Terms:\nsynergy",
            "Do's:\n- Share numbers",
            "Don'ts:\n- Humblebrag",
            "Platform Rules (Twitter):\n- Style: punchy",
            "Tone Attributes",
            "Username: @jane",
            "Important rules:",
        ];
        let mut last = 0;
        for needle in order {
            let pos = system
                .find(needle)
                .unwrap_or_else(|| panic!("missing section: {needle}"));
            assert!(pos >= last, "section out of order: {needle}");
            last = pos;
        }
    }

    #[test]
    fn test_basic_style_omits_extended_sections() {
        let req = GenerateRequest::new("topic", "v1");
        let system = build_prompts(&req, &rich_voice(), None, PromptStyle::BASIC).system;
        assert!(!system.contains("Vocabulary"));
        assert!(!system.contains("Do's"));
        assert!(!system.contains("Platform Rules"));
        assert!(system.contains("- Formality: 50/100\n"));
        assert!(system.contains("- Energy: 50/100\n"));
    }

    #[test]
    fn test_annotated_tone_lines() {
        let req = GenerateRequest::new("topic", "v1");
        let system = build_prompts(&req, &rich_voice(), None, PromptStyle::FULL).system;
        assert!(system.contains("- Formality: 50/100 (0=very casual, 100=very professional)\n"));
        assert!(system.contains("- Authenticity: 50/100 (0=reserved, 100=vulnerable/personal)\n"));
    }

    #[test]
    fn test_tone_adjustment_applied() {
        let mut req = GenerateRequest::new("topic", "v1");
        req.tone_adjustment = Some(ToneAdjustment {
            humor: Some(25),
            formality: Some(-80),
            ..Default::default()
        });
        let system = build_prompts(&req, &rich_voice(), None, PromptStyle::EXTENDED).system;
        assert!(system.contains("- Humor: 75/100\n"));
        assert!(system.contains("- Formality: 0/100\n"));
    }

    #[test]
    fn test_target_profile_block_caps_phrases() {
        let req = GenerateRequest::new("topic", "v1");
        let profile = target(15);
        let system = build_prompts(&req, &rich_voice(), Some(&profile), PromptStyle::BASIC).system;
        assert!(system.contains("Their typical tweet length: 120 characters"));
        assert!(system.contains("phrase9"));
        assert!(!system.contains("phrase10"));
        assert!(system.ends_with(
            "- Acknowledge and respond to the specific points in the tweet you're replying to\n"
        ));
    }

    #[test]
    fn test_thread_user_prompt() {
        let req = GenerateRequest::new("rust tips", "v1").thread(3);
        let user = build_prompts(&req, &rich_voice(), None, PromptStyle::BASIC).user;
        assert_eq!(
            user,
            "Create a Twitter thread with 3 tweets based on this topic:\n\nrust tips\n\nReturn each tweet on a new line, numbered 1-3."
        );
    }

    #[test]
    fn test_thread_length_defaults_to_five() {
        let mut req = GenerateRequest::new("rust tips", "v1");
        req.is_thread = true;
        let user = build_prompts(&req, &rich_voice(), None, PromptStyle::BASIC).user;
        assert!(user.contains("with 5 tweets"));
        assert!(user.ends_with("numbered 1-5."));
    }

    #[test]
    fn test_reply_context_prompt() {
        let mut req = GenerateRequest::new("be supportive", "v1");
        req.reply_context = Some(ReplyContext {
            username: "jane".into(),
            display_name: Some("Jane Doe".into()),
            timestamp: Some("2h".into()),
            text: "Just launched my first app!".into(),
            images: vec!["screenshot of the app".into()],
            metrics: Some(EngagementMetrics {
                replies: 3,
                retweets: 0,
                likes: 12,
            }),
        });
        let prompts = build_prompts(&req, &rich_voice(), None, PromptStyle::FULL);

        assert!(prompts.user.starts_with("[CONTEXT - THE TWEET WE ARE REPLYING TO]\n"));
        assert!(prompts.user.contains("Author: @jane (Jane Doe)\n"));
        assert!(prompts.user.contains("Time: 2h\n"));
        assert!(prompts.user.contains("Content: \"Just launched my first app!\"\n"));
        assert!(prompts.user.contains("Visual Context (Image Alt Text): screenshot of the app\n"));
        assert!(prompts.user.contains("Metrics: 3 replies, 12 likes\n"));
        assert!(prompts
            .user
            .ends_with("[YOUR TASK]\nWrite a reply to the above tweet based on this instruction:\n\"be supportive\"\n"));
        assert!(prompts.system.contains("Acknowledge and respond"));
    }

    #[test]
    fn test_combined_prompt() {
        let prompts = Prompts {
            system: "SYS".into(),
            user: "USER".into(),
        };
        assert_eq!(prompts.combined(), "SYS\n\nUser Request:\nUSER");
    }

    #[test]
    fn test_analysis_prompts() {
        let prompts = build_analysis_prompts(&["gm".to_string(), "wagmi".to_string()]);
        assert!(prompts.system.contains("\"avgLength\""));
        assert!(prompts.system.contains("Return ONLY a valid JSON object"));
        assert_eq!(prompts.user, "Analyze these tweets:\n\n1. gm\n2. wagmi");
    }
}
