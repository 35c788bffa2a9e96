use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    name = "quill",
    version,
    about = "Generate a poem in your terminal with a little help from an LLM"
)]
pub struct Cli {
    /// Poem prompt; skips the interactive entry view and generates immediately
    #[clap(long, short)]
    pub prompt: Option<String>,

    /// Enable debug logging regardless of the DEBUG environment variable
    #[clap(long)]
    pub debug: bool,
}

impl Cli {
    /// A prompt qualifies for direct mode only if it has visible content.
    pub fn direct_prompt(&self) -> Option<String> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
            .map(str::to_string)
    }
}
