//! Compiled-in letter → word table shared by the plate codec.
//!
//! The table is a `static` array in `A..Z` order.  It is never mutated, so
//! concurrent readers need no synchronisation.  Lookups by letter index
//! directly; reverse lookups scan in table order and return the first hit.

/// One row of the table: a letter and its candidate words.
pub type WordRow = (char, &'static [&'static str]);

pub static WORDLIST: [WordRow; 26] = [
    ('A', &["APPLE", "ATOM", "ARROW", "ACORN"]),
    ('B', &["BEAR", "BOX", "BUBBLE", "BRIDGE"]),
    ('C', &["CAT", "CANYON", "CIDER", "COMET"]),
    ('D', &["DOG", "DUNE", "DRAGON", "DELTA"]),
    ('E', &["EAGLE", "EARTH", "EMBER", "ENGINE"]),
    ('F', &["FROG", "FLAME", "FROST", "FIDDLE"]),
    ('G', &["GHOST", "GALAXY", "GEM", "GRAPE"]),
    ('H', &["HORSE", "HOUSE", "HONEY", "HUB"]),
    ('I', &["ICE", "IGLOO", "INK", "IRON"]),
    ('J', &["JAZZ", "JUMP", "JELLY", "JUPITER"]),
    ('K', &["KING", "KITE", "KOALA", "KNIGHT"]),
    ('L', &["LION", "LASER", "LAVA", "LEAF"]),
    ('M', &["MOON", "MAPLE", "MAGIC", "MIST"]),
    ('N', &["NOVA", "NUT", "NIGHT", "NEON"]),
    ('O', &["OWL", "OCEAN", "ORBIT", "ONYX"]),
    ('P', &["PIZZA", "PANDA", "PEAR", "PLUTO"]),
    ('Q', &["QUILL", "QUAKE", "QUARTZ", "QUEEN"]),
    ('R', &["ROBOT", "RIVER", "RUBY", "RAIN"]),
    ('S', &["SUN", "SPICE", "STAR", "SAGE"]),
    ('T', &["TACO", "TREE", "TIGER", "TORCH"]),
    ('U', &["UMBER", "UNICORN", "URANUS", "USHER"]),
    ('V', &["VANILLA", "VOLCANO", "VIOLET", "VEX"]),
    ('W', &["WOLF", "WATER", "WIND", "WAX"]),
    ('X', &["XENON", "XYLOPHONE", "X-RAY", "XTRA"]),
    ('Y', &["YAK", "YELLOW", "YARN", "YONDER"]),
    ('Z', &["ZEBRA", "ZEUS", "ZINC", "ZEST"]),
];

/// Words for an upper-case ASCII letter, or `None` for anything else.
pub fn words_for(letter: char) -> Option<&'static [&'static str]> {
    if !letter.is_ascii_uppercase() {
        return None;
    }
    let (_, words) = WORDLIST[(letter as u8 - b'A') as usize];
    Some(words)
}

/// The first letter (in table order) whose list contains `word`.
/// Comparison is exact; callers upper-case first.
pub fn letter_for_word(word: &str) -> Option<char> {
    WORDLIST
        .iter()
        .find(|(_, words)| words.contains(&word))
        .map(|(letter, _)| *letter)
}

/// True if `word` appears anywhere in the table.
pub fn contains_word(word: &str) -> bool {
    letter_for_word(word).is_some()
}
