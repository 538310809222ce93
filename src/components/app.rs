use yew::prelude::*;

use super::{banner::Banner, globe_view::GlobeView};
use crate::state::GlobeConfig;

const INTRO_TEXT: &str = "Drag to spin the globe. Each marker is a club.";

#[function_component(App)]
pub fn app() -> Html {
    let banner_text = use_state(|| INTRO_TEXT.to_string());
    let banner_visible = use_state(|| true);

    let on_caption = {
        let banner_text = banner_text.clone();
        let banner_visible = banner_visible.clone();
        Callback::from(move |name: String| {
            banner_text.set(name);
            banner_visible.set(true);
        })
    };
    // Dismiss-on-leave policy: leaving all markers hides the caption.
    let on_caption_clear = {
        let banner_visible = banner_visible.clone();
        Callback::from(move |_| banner_visible.set(false))
    };
    let on_hide_banner = {
        let banner_visible = banner_visible.clone();
        Callback::from(move |_| banner_visible.set(false))
    };

    html! {
        <div style="position:relative; width:100vw; height:100vh; overflow:hidden; background:#0e1116; color:#e6edf3; font-family:sans-serif;">
            <GlobeView
                config={GlobeConfig::default()}
                on_caption={on_caption}
                on_caption_clear={on_caption_clear}
                on_hide_banner={on_hide_banner}
            />
            <Banner text={(*banner_text).clone()} visible={*banner_visible} />
        </div>
    }
}
