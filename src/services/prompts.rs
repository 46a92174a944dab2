//! Prompt construction for the suggestion engine
//!
//! Every function here returns finished prompt strings; nothing in this
//! module performs I/O. Each prompt states the constraints the completion
//! service is expected to honor (exact count, artist cap, lesser-known
//! share, exclusions) and the exact JSON shape it must reply with.

use crate::types::Track;

/// Render a seed/reference list as `"Title" by Artist, ...`.
pub fn track_list(tracks: &[Track]) -> String {
    tracks
        .iter()
        .map(Track::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Candidate universe rendered as the JSON the model picks from.
fn candidates_json(candidates: &[Track]) -> String {
    serde_json::to_string(candidates).unwrap_or_else(|_| "[]".to_string())
}

/// System + user prompt for seed-based curation over a candidate pool.
pub fn seeded_batch(
    seeds: &[Track],
    analysis: Option<&str>,
    qa_context: Option<&str>,
    candidates: &[Track],
    target_size: usize,
) -> (String, String) {
    let system = format!(
        "You are an expert music curator. You build playlists that make the listener feel \
someone read their mind.\n\n\
Build a listener profile in two layers: a technical layer (40% weight) derived from the \
internal analysis, sound density, dynamics, texture, production style, voice/music \
balance, tempo and energy range, and an emotional, situational layer (60% weight) derived \
from the listener's answers, the core emotion with all its nuance, any deliberate \
emotional tension, the image or moment the playlist must evoke, the narrative it should \
tell, and the state it should leave the listener in.\n\n\
Select exactly {target_size} songs from the candidate list and order them as an emotional \
arc: an entry (first 20%) that introduces the state gradually, a core (middle 60%), and a \
close (final 20%) that resolves, intensifies or leaves it suspended.\n\n\
Rules:\n\
- At most 2 songs by the same artist.\n\
- At least 30% songs the listener probably does not know.\n\
- Every pick is justified by the profile, not only by genre.\n\
- Emotional coherence outranks genre coherence.\n\n\
Respond ONLY with JSON:\n\
{{\"songs\": [{{\"title\": \"...\", \"artist\": \"...\"}}]}}"
    );

    let user = format!(
        "Listener's seed songs: {seeds}\n\n\
Internal analysis of the seeds (technical layer, 40% weight):\n{analysis}\n\n\
Listener's answers (situational and emotional layer, 60% weight):\n{qa}\n\n\
Candidate tracks to choose from:\n{candidates}\n\n\
Build the profile and select the {target_size} best songs.",
        seeds = track_list(seeds),
        analysis = analysis.filter(|a| !a.trim().is_empty()).unwrap_or("Not available"),
        qa = qa_context
            .filter(|q| !q.trim().is_empty())
            .unwrap_or("No specific preferences"),
        candidates = candidates_json(candidates),
    );

    (system, user)
}

/// System + user prompt for intention-based discovery.
pub fn intention_batch(
    intention: &str,
    genres: Option<&str>,
    references: &[Track],
    target_size: usize,
) -> (String, String) {
    let system = format!(
        "You are an expert music curator. The listener describes a moment or intention; \
your job is to build the perfect playlist for it.\n\n\
Analyze the intention in depth: the core emotion underneath it with nuance and \
specificity, whether the listener wants to hold that state or transform it, the image, \
place or time of day it evokes, and the narrative the playlist should tell. Order the \
songs as an emotional arc: a gradual entry, an emotional core, and a close that resolves, \
intensifies or leaves it suspended. If genres are given, use them as a frame, not a \
limit: a song from another genre that fits emotionally beats one from the right genre \
that does not. If reference songs are given, find what they share emotionally and chase that \
feeling, not necessarily that genre.\n\n\
Rules:\n\
- The intention outranks genres and references.\n\
- At least 30% songs the listener probably does not know.\n\
- At most 2 songs by the same artist.\n\
- Do not include the reference songs in the playlist.\n\
- Every song is justified by the intention, not only by genre.\n\
- Emotional coherence outranks genre coherence.\n\n\
Generate exactly {target_size} songs.\n\n\
Respond ONLY with JSON:\n\
{{\"songs\": [{{\"title\": \"...\", \"artist\": \"...\"}}]}}"
    );

    let mut user = format!("Intention: {intention}");
    if let Some(genres) = genres.filter(|g| !g.trim().is_empty()) {
        user.push_str(&format!("\n\nPreferred genres: {genres}"));
    }
    if !references.is_empty() {
        user.push_str(&format!(
            "\n\nListener's reference songs (find what they share emotionally and look for \
that feeling, not necessarily the same genre):\n{}",
            references
                .iter()
                .map(|t| format!("- {t}"))
                .collect::<Vec<_>>()
                .join("\n")
        ));
        user.push_str(&format!(
            "\n\nDo NOT include these songs: {}",
            track_list(references)
        ));
    }

    (system, user)
}

/// System + user prompt for surprise-mode discovery: intention only, no
/// genres or references, deeper cuts required.
pub fn surprise_batch(intention: &str, target_size: usize) -> (String, String) {
    let system = format!(
        "You are the best music curator in the world. Your only input is an intention, no \
genres, no references, just that moment. It is enough.\n\n\
Your job: build a playlist that makes the listener think \"how did it know exactly what I \
needed?\". Analyze the intention in depth, the exact shade of the core emotion, whether \
to hold or transform it, the image, place or time of day it evokes, the narrative from \
first song to last. Cross genres in unexpected but coherent ways: a night-drive playlist \
can move through synthwave, late-night jazz, indie folk and R&B and still flow if it is \
emotionally consistent.\n\n\
Rules:\n\
- At least 40% songs the listener probably does not know, deep cuts, hidden gems, \
lesser-known albums of famous artists.\n\
- Never the most obvious hits; find the song fans know but the general public does not.\n\
- Vary eras, genres and musical cultures within the emotional coherence.\n\
- At most 2 songs by the same artist.\n\
- Every song has a clear reason to be there; if you cannot justify it, leave it out.\n\
- The playlist flows: the end of each song prepares the next.\n\n\
Generate exactly {target_size} songs.\n\n\
Respond ONLY with JSON:\n\
{{\"songs\": [{{\"title\": \"...\", \"artist\": \"...\"}}]}}"
    );

    let user = format!("Intention: {intention}");

    (system, user)
}

/// Base prompt for a single intention-mode replacement. The engine appends
/// the exclusion list.
pub fn discover_replacement(
    intention: &str,
    genres: Option<&str>,
    references: &[Track],
) -> String {
    let mut prompt = format!("Suggest ONE song that fits this intention: \"{intention}\"");
    if let Some(genres) = genres.filter(|g| !g.trim().is_empty()) {
        prompt.push_str(&format!(". Preferred genres: {genres}"));
    }
    if !references.is_empty() {
        prompt.push_str(&format!("\nReference songs: {}", track_list(references)));
    }
    prompt.push_str("\n\nRespond ONLY with JSON:\n{\"title\": \"...\", \"artist\": \"...\"}");
    prompt
}

/// Append the accumulated exclusion list to a replacement prompt.
pub fn with_exclusions(base_prompt: &str, excluded: &[String]) -> String {
    if excluded.is_empty() {
        return base_prompt.to_string();
    }
    format!(
        "{base_prompt}\n\nYou must NOT suggest any of these songs: {}",
        excluded.join(", ")
    )
}

/// System + user prompt for question generation from seed songs.
pub fn questions(seeds: &[Track]) -> (String, String) {
    let system = "You are an expert in music psychology and taste profiling. You receive a \
list of songs the listener loves.\n\n\
PHASE 1 - INTERNAL ANALYSIS (never shown to the listener):\n\
Analyze the songs in two layers. Technical (40%): tempo, energy, sonic structure, \
production era, vocal prominence, weighting what matters for the detected genre \
(compositional structure for classical, flow and lyrical narrative for rap, texture and \
sound construction for electronic). Emotional/narrative (60%): the dominant emotion and \
whether it is simple or contradictory, the image or moment the songs evoke, the \
underlying tension connecting them, the non-obvious pattern between them.\n\n\
PHASE 2 - THREE SITUATIONAL QUESTIONS:\n\
From the analysis, generate 3 questions that explore WHY the listener loves these songs, \
not WHAT they are technically. They must be situational or emotional, how the listener \
feels, what moment the music is for, what they want it to give them, phrased the way a \
friend who knows music would ask, never an algorithm. Never mention genre, BPM, tempo, \
instrumentation or any technical jargon, and adapt the register to the detected kind of \
music.\n\n\
Each question has 4 concrete, evocative options plus an open field (5 in total). The 4 \
options must sit in clearly different registers, one direct and practical, one \
evocative or metaphorical, one physical or sensory, one social or contextual, never four \
variations of the same idea at different intensities, and never described with musical \
adjectives. The fifth option is always: \"Something else: ___\".\n\n\
Respond ONLY with JSON, no extra text:\n\
{\"analysis\": \"[full internal analysis, used later to build the playlist, never shown \
to the listener]\", \"questions\": [{\"question\": \"...\", \"options\": [\"...\", \
\"...\", \"...\", \"...\", \"Something else: ___\"]}]}"
        .to_string();

    let user = format!("Selected songs: {}", track_list(seeds));

    (system, user)
}

/// System + user prompt for feedback-driven refinement of an existing
/// playlist.
pub fn refine(
    seeds: &[Track],
    current: &[Track],
    feedback: &str,
    candidates: &[Track],
    target_size: usize,
) -> (String, String) {
    let system = format!(
        "You are a music curator refining an existing playlist from listener feedback.\n\n\
Work out which dimension the feedback criticizes: energy (\"more upbeat\", \"calmer\"), \
genre or style (\"no electronic\", \"more guitars\"), emotion (\"happier\", \"less \
melancholic\"), or fit with the original request. Keep every current song that already \
satisfies the feedback; replace only the ones that do not, correcting exactly what was \
criticized without breaking what worked. The refined playlist is an evolution of the \
original, not a full replacement.\n\n\
Rules:\n\
- Energy feedback: adjust energy, not necessarily genre.\n\
- Style feedback: keep the emotional feel but change the sonic texture.\n\
- Emotional feedback: prioritize that change above everything else.\n\
- Emotional coherence outranks genre coherence.\n\
- At most 2 songs by the same artist in the final playlist.\n\n\
Respond ONLY with JSON:\n\
{{\"songs\": [{{\"title\": \"...\", \"artist\": \"...\"}}]}} with exactly {target_size} songs."
    );

    let user = format!(
        "Original seed songs: {seeds}\n\n\
Current playlist: {current}\n\n\
Listener feedback: \"{feedback}\"\n\n\
Available candidates:\n{candidates}\n\n\
Create a refined playlist of {target_size} songs based on the feedback.",
        seeds = track_list(seeds),
        current = track_list(current),
        candidates = candidates_json(candidates),
    );

    (system, user)
}

/// Base prompt for substituting one song in a seed-based playlist.
pub fn substitute_seeded(
    seeds: &[Track],
    analysis: Option<&str>,
    answers: &[String],
    current: &[Track],
    discarded: &Track,
) -> String {
    let artists = playlist_artists(current);
    format!(
        "You are a music curator substituting ONE song in a playlist.\n\n\
Context:\n\
- Original seed songs: {seeds}\n\
- Internal analysis of the seeds: {analysis}\n\
- Listener's answers to the questions: {answers}\n\
- Current playlist (without the discarded song): {current}\n\
- Discarded song: {discarded}\n\
- Artists already in the playlist (do NOT repeat): {artists}\n\n\
Your task: suggest ONE song that shares the texture, sound density and production of the \
set, fits the core emotion and emotional arc of the playlist, respects the listener's \
situational answers, is not by any artist already present, and is preferably less known \
than the seed songs.\n\n\
Respond ONLY with JSON:\n{{\"title\": \"...\", \"artist\": \"...\"}}",
        seeds = track_list(seeds),
        analysis = analysis.filter(|a| !a.trim().is_empty()).unwrap_or("Not available"),
        answers = if answers.is_empty() {
            "No answers".to_string()
        } else {
            answers.join("\n")
        },
        current = track_list(current),
    )
}

/// Base prompt for substituting one song in an intention-based playlist.
/// `no_moment` (the song did not fit the requested moment) re-matches the
/// intention even across genres; `no_style` keeps the emotional feel but
/// changes the sonic texture.
pub fn substitute_intention(
    intention: &str,
    current: &[Track],
    discarded: &Track,
    discard_reason: Option<DiscardReason>,
) -> String {
    let artists = playlist_artists(current);
    let current = track_list(current);

    let (reason_line, instruction) = match discard_reason {
        Some(DiscardReason::NoMoment) => (
            "\n- Discard reason: the listener says the song does not fit the moment or \
intention they asked for"
                .to_string(),
            "Find something that matches the intention more faithfully, even if it changes \
genre or style completely.",
        ),
        Some(DiscardReason::NoStyle) => (
            "\n- Discard reason: the listener says they dislike the style or sound of the \
song"
                .to_string(),
            "Keep the emotional feel of the discarded song but look for a different sonic \
texture and production.",
        ),
        None => (
            String::new(),
            "Suggest ONE different song that fits the intention. It can be from any genre \
if it is emotionally right.",
        ),
    };

    format!(
        "You are a music curator substituting ONE song in a playlist.\n\n\
Context:\n\
- Playlist created for: \"{intention}\"\n\
- Current playlist (without the discarded song): {current}\n\
- Discarded song: {discarded}{reason_line}\n\
- Artists already in the playlist (do NOT repeat): {artists}\n\n\
{instruction} Do not repeat artists already present in the playlist.\n\n\
Respond ONLY with JSON:\n{{\"title\": \"...\", \"artist\": \"...\"}}"
    )
}

/// Why the listener discarded a track in intention mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscardReason {
    NoMoment,
    NoStyle,
}

fn playlist_artists(current: &[Track]) -> String {
    current
        .iter()
        .map(|t| t.artist.to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}
