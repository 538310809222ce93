mod components;
mod fetch;
mod model;
mod state;
mod topology;
mod util;

use components::app::App;

fn main() {
    yew::Renderer::<App>::new().render();
}
