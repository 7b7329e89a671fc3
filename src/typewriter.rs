use crate::ui::Surface;
use rand::seq::SliceRandom;
use std::time::Duration;

pub const CHAR_DELAY: Duration = Duration::from_millis(60);

pub const QUOTES: [&str; 5] = [
    "Science is organized knowledge.",
    "Every sample counts.",
    "Good records make good research.",
    "Measure twice, pipette once.",
    "Curiosity is the engine of discovery.",
];

/// Reveals one quote a character at a time. Consumed by [`Typewriter::run`],
/// so it plays at most once.
#[derive(Debug)]
pub struct Typewriter {
    text: &'static str,
    delay: Duration,
}

impl Typewriter {
    pub fn random() -> Self {
        Self::pick(&mut rand::thread_rng())
    }

    pub fn pick<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let text = QUOTES.choose(rng).copied().unwrap_or(QUOTES[0]);
        Self::new(text, CHAR_DELAY)
    }

    pub fn new(text: &'static str, delay: Duration) -> Self {
        Self { text, delay }
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    /// Successive prefixes of the text, one more character each.
    pub fn frames(&self) -> Vec<&'static str> {
        let text = self.text;
        text.char_indices()
            .map(|(index, c)| &text[..index + c.len_utf8()])
            .collect()
    }

    pub async fn run(self, surface: &dyn Surface) {
        let mut ticker = tokio::time::interval(self.delay);
        for frame in self.frames() {
            ticker.tick().await;
            surface.display_text(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{RecordingSurface, SurfaceEvent};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn frames_grow_one_character_at_a_time() {
        let typewriter = Typewriter::new("Olá", CHAR_DELAY);
        assert_eq!(typewriter.frames(), vec!["O", "Ol", "Olá"]);
    }

    #[test]
    fn pick_comes_from_the_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert!(QUOTES.contains(&Typewriter::pick(&mut rng).text()));
        }
    }

    #[tokio::test]
    async fn run_displays_every_prefix() {
        let surface = RecordingSurface::new();
        Typewriter::new("abc", Duration::from_millis(1)).run(&surface).await;
        assert_eq!(
            surface.events(),
            vec![
                SurfaceEvent::Text("a".into()),
                SurfaceEvent::Text("ab".into()),
                SurfaceEvent::Text("abc".into()),
            ]
        );
    }
}
