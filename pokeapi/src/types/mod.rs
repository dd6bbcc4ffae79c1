mod meta;
pub use self::meta::{NamedResource, ResourceList};

mod pokemon;
pub use self::pokemon::{AbilitySlot, Pokemon, PokemonID, Sprites, StatEntry, TypeSlot};

mod species;
pub use self::species::Species;
