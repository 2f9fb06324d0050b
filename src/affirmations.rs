use chrono::{Datelike, Local};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affirmation {
    pub text: &'static str,
    pub subtext: &'static str,
}

const fn a(text: &'static str, subtext: &'static str) -> Affirmation {
    Affirmation { text, subtext }
}

pub const AFFIRMATIONS: [Affirmation; 20] = [
    a("You are allowed to take up space.", "Your presence matters, your voice deserves to be heard, and you don't need to make yourself smaller for anyone."),
    a("You are loved in ways you don't even see yet.", "The impact you have on others is deeper than you realize. You are cherished more than you know."),
    a("Even on quiet days, you matter.", "Your worth isn't measured by productivity. Rest is not wasted time. You are enough, simply as you are."),
    a("Your feelings are valid, every single one.", "You don't need to justify how you feel. Your emotions deserve space and compassion, especially from yourself."),
    a("You are doing better than you think.", "Give yourself credit for showing up, for trying, for getting through the hard days. That takes courage."),
    a("It's okay to not be okay right now.", "You don't have to have it all figured out. Healing isn't linear, and struggle doesn't mean you're failing."),
    a("You deserve kindness, especially from yourself.", "Treat yourself with the same gentleness you'd offer a dear friend. You are worthy of your own compassion."),
    a("Your journey is your own, and that's beautiful.", "You don't need to compare your path to anyone else's. Your timeline is perfect for you."),
    a("You are stronger than you believe.", "Look at everything you've already survived. That strength is still within you, always."),
    a("You bring light to the world just by being you.", "Your unique presence, your quirks, your authenticity: these are gifts. Never dim your light."),
    a("It's brave to be vulnerable.", "Opening your heart, sharing your truth, asking for help: these aren't weaknesses. They're acts of courage."),
    a("You are more than your mistakes.", "Your past doesn't define your future. Every moment is a chance to begin again with grace."),
    a("Your dreams are worth pursuing.", "Don't let fear or doubt steal your aspirations. You deserve to chase the things that make your soul sing."),
    a("You are not a burden.", "The people who love you want to support you. Letting them in is a gift to both of you."),
    a("Progress, not perfection.", "Every small step forward counts. You don't have to be perfect to be moving in the right direction."),
    a("You are seen, you are heard, you are valued.", "Your story matters. Your experiences are meaningful. You are an irreplaceable part of this world."),
    a("It's okay to rest without guilt.", "Rest is how you recharge. Taking time for yourself isn't selfish; it's necessary and wise."),
    a("You are allowed to change your mind.", "Growth means evolving. You're not stuck with who you used to be or what you once believed."),
    a("Your soft heart is a superpower.", "In a world that can be harsh, your tenderness, empathy, and care are revolutionary gifts."),
    a("You are exactly where you need to be.", "Trust the timing of your life. Every experience is shaping you into who you're meant to become."),
];

/// Entry for a day of the year, January 1 being day 1.
pub fn for_day(ordinal: u32) -> &'static Affirmation {
    &AFFIRMATIONS[ordinal as usize % AFFIRMATIONS.len()]
}

pub fn today() -> &'static Affirmation {
    for_day(Local::now().ordinal())
}
