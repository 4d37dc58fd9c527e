use super::{Category, Preset, Theme};

const fn preset(name: &'static str, prompt: &'static str) -> Preset {
    Preset {
        name,
        prompt,
        image_url: None,
    }
}

const fn preset_with_image(
    name: &'static str,
    prompt: &'static str,
    image_url: &'static str,
) -> Preset {
    Preset {
        name,
        prompt,
        image_url: Some(image_url),
    }
}

pub(super) fn presets(theme: Theme, category: Category) -> &'static [Preset] {
    match (theme, category) {
        (Theme::Cyberpunk, Category::Clothing) => CYBERPUNK_CLOTHING,
        (Theme::Cyberpunk, Category::Modifications) => CYBERPUNK_MODIFICATIONS,
        (Theme::Cyberpunk, Category::Effects) => CYBERPUNK_EFFECTS,
        (Theme::Cyberpunk, Category::Environment) => CYBERPUNK_ENVIRONMENT,
        (Theme::Cyberpunk, Category::Actions) => CYBERPUNK_ACTIONS,
        (Theme::Fantasy, Category::Clothing) => FANTASY_CLOTHING,
        (Theme::Fantasy, Category::Modifications) => FANTASY_MODIFICATIONS,
        (Theme::Fantasy, Category::Effects) => FANTASY_EFFECTS,
        (Theme::Fantasy, Category::Environment) => FANTASY_ENVIRONMENT,
        (Theme::Fantasy, Category::Actions) => FANTASY_ACTIONS,
    }
}

// ============================================================================
// Cyberpunk
// ============================================================================

const CYBERPUNK_CLOTHING: &[Preset] = &[
    preset(
        "Street Samurai",
        "armored street samurai jacket with a high collar and glowing red trim",
    ),
    preset(
        "Netrunner Suit",
        "sleek black netrunner bodysuit with fiber-optic lines running along the seams",
    ),
    preset(
        "Corpo Executive",
        "sharp tailored corporate suit with metallic lapels and a holographic tie pin",
    ),
    preset(
        "Nomad Leathers",
        "dusty nomad leather jacket with patches, scarves and utility straps",
    ),
    preset(
        "Neon Raincoat",
        "translucent vinyl raincoat with neon piping over a dark turtleneck",
    ),
];

const CYBERPUNK_MODIFICATIONS: &[Preset] = &[
    preset(
        "Optical Implants",
        "replace the eyes with glowing cyan optical implants with fine circuitry",
    ),
    preset(
        "Chrome Arm",
        "give the person a polished chrome cybernetic arm with exposed actuators",
    ),
    preset(
        "Face Circuitry",
        "add subtle subdermal circuit tattoos that glow faintly along the cheekbones",
    ),
    preset(
        "Neon Hair",
        "dye the hair an electric magenta with a shaved undercut",
    ),
];

const CYBERPUNK_EFFECTS: &[Preset] = &[
    preset(
        "Glitch",
        "digital glitch effect with RGB channel splitting and scanline tearing",
    ),
    preset(
        "Synthwave",
        "synthwave color grade with deep purples, hot pinks and a retro glow",
    ),
    preset(
        "Holo Film",
        "holographic iridescent film overlay with soft chromatic aberration",
    ),
    preset(
        "Night Vision",
        "green phosphor night-vision look with grain and a vignette",
    ),
];

const CYBERPUNK_ENVIRONMENT: &[Preset] = &[
    preset_with_image(
        "Neon Alley",
        "a dark, rainy alley in a futuristic city, lit by vibrant neon signs",
        "https://i.imgur.com/VUMx61N.png",
    ),
    preset_with_image(
        "Spaceship Hangar",
        "a vast, industrial spaceship hangar with a large vessel in the background",
        "https://i.imgur.com/cFDJpA2.png",
    ),
    preset_with_image(
        "Rooftop View",
        "a high-rise rooftop overlooking a sprawling cyberpunk city at night",
        "https://i.imgur.com/fJ3h4iG.png",
    ),
    preset_with_image(
        "Desert Wasteland",
        "a desolate, post-apocalyptic desert wasteland with a single sun",
        "https://i.imgur.com/3g8h5pS.png",
    ),
    preset_with_image(
        "Mega-Tower",
        "the luxurious penthouse of a mega-tower, with floor-to-ceiling windows",
        "https://i.imgur.com/2s4s5Jt.png",
    ),
    preset_with_image(
        "Undercity Market",
        "a crowded, bustling undercity market filled with strange vendors",
        "https://i.imgur.com/sTqSgDB.jpeg",
    ),
    preset_with_image(
        "Orbital Station",
        "an orbital space station, with a view of the Earth below",
        "https://i.imgur.com/7XyXR2q.png",
    ),
    preset_with_image(
        "Bio-Dome Garden",
        "a lush, synth-organic garden inside a massive bio-dome",
        "https://i.imgur.com/5J3BCs5.png",
    ),
];

const CYBERPUNK_ACTIONS: &[Preset] = &[
    preset(
        "Hacking",
        "typing on a floating holographic keyboard, face lit by the display",
    ),
    preset(
        "Combat Stance",
        "crouched in a ready combat stance, one hand near a holstered pistol",
    ),
    preset(
        "Leaning Cool",
        "leaning casually against a wall with arms crossed",
    ),
    preset(
        "Bike Ride",
        "riding a low futuristic motorcycle, leaning into a turn",
    ),
];

// ============================================================================
// Fantasy
// ============================================================================

const FANTASY_CLOTHING: &[Preset] = &[
    preset(
        "Knight Armor",
        "polished plate armor with a royal blue tabard and a fur-lined cape",
    ),
    preset(
        "Wizard Robes",
        "flowing star-embroidered wizard robes with a tall pointed hood",
    ),
    preset(
        "Ranger Cloak",
        "forest-green ranger cloak over supple leather armor and bracers",
    ),
    preset(
        "Court Gown",
        "an ornate royal court outfit of velvet and gold brocade",
    ),
];

const FANTASY_MODIFICATIONS: &[Preset] = &[
    preset("Elf Ears", "give the person long, elegant elven ears"),
    preset(
        "Glowing Runes",
        "add softly glowing arcane runes tattooed along the arms and neck",
    ),
    preset(
        "Silver Hair",
        "make the hair long, flowing and silver-white",
    ),
    preset(
        "Dragon Scales",
        "add a few iridescent dragon scales along the temples and jawline",
    ),
];

const FANTASY_EFFECTS: &[Preset] = &[
    preset(
        "Oil Painting",
        "classical oil painting look with visible brush strokes and warm varnish",
    ),
    preset(
        "Storybook",
        "soft watercolor storybook illustration style",
    ),
    preset(
        "Enchanted Glow",
        "magical golden rim light with drifting sparkles",
    ),
];

const FANTASY_ENVIRONMENT: &[Preset] = &[
    preset(
        "Castle Hall",
        "the great hall of a stone castle with banners and torchlight",
    ),
    preset(
        "Enchanted Forest",
        "an ancient enchanted forest with glowing mushrooms and mist",
    ),
    preset(
        "Mountain Pass",
        "a windswept mountain pass above the clouds at sunrise",
    ),
    preset(
        "Tavern",
        "a cozy medieval tavern with a roaring fireplace",
    ),
];

const FANTASY_ACTIONS: &[Preset] = &[
    preset(
        "Casting Spell",
        "casting a spell with one hand raised, magic swirling around the fingers",
    ),
    preset(
        "Drawing Sword",
        "drawing a sword from its scabbard, ready for battle",
    ),
    preset(
        "Reading Tome",
        "reading an ancient leather-bound tome held in both hands",
    ),
];
