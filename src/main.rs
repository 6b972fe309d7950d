use yew_particle_snake::components::app::App;

fn main() {
    yew::Renderer::<App>::new().render();
}
